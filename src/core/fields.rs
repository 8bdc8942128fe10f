//! Session fields published to observers.
//!
//! Every value the client learns from the reflector (parsed frame fields,
//! status transitions, reported errors) is published as a `(Field, text)`
//! pair. Observers decide how to render each pair; the three numeric
//! identifier fields are conventionally shown as hexadecimal by the
//! observer, not by the core.

/// One named session field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Stream identifier of the current voice stream.
    StreamId,
    /// Frame counter within the stream.
    FrameNumber,
    /// Destination callsign from the LICH.
    Destination,
    /// Source callsign from the LICH.
    Source,
    /// Raw 16-bit type field from the LICH.
    Type,
    /// LICH metadata bytes, hex-encoded.
    Meta,
    /// Stream-versus-packet indicator bit.
    PacketStreamIndicator,
    /// Data type indicator (voice, data, voice+data).
    DataTypeIndicator,
    /// Encryption type bits.
    EncryptionType,
    /// Encryption subtype bits.
    EncryptionSubtype,
    /// Channel access number.
    ChannelAccessNumber,
    /// Voice payload bytes, hex-encoded.
    Payload,
    /// Session status line.
    Status,
    /// Most recent non-fatal error.
    Error,
}

impl Field {
    /// All fields in dashboard display order.
    pub const ALL: [Field; 14] = [
        Field::StreamId,
        Field::FrameNumber,
        Field::Destination,
        Field::Source,
        Field::Type,
        Field::Meta,
        Field::PacketStreamIndicator,
        Field::DataTypeIndicator,
        Field::EncryptionType,
        Field::EncryptionSubtype,
        Field::ChannelAccessNumber,
        Field::Payload,
        Field::Status,
        Field::Error,
    ];

    /// Human-readable label for display front ends.
    pub fn label(&self) -> &'static str {
        match self {
            Field::StreamId => "Stream ID",
            Field::FrameNumber => "Frame Number",
            Field::Destination => "Destination",
            Field::Source => "Source",
            Field::Type => "Type",
            Field::Meta => "Metadata",
            Field::PacketStreamIndicator => "Packet Stream Indicator",
            Field::DataTypeIndicator => "Data Type Indicator",
            Field::EncryptionType => "Encryption Type",
            Field::EncryptionSubtype => "Encryption Subtype",
            Field::ChannelAccessNumber => "Channel Access Number",
            Field::Payload => "Payload",
            Field::Status => "Status",
            Field::Error => "Error",
        }
    }

    /// Whether observers render this field's decimal text with a `0x`
    /// hexadecimal prefix.
    pub fn is_hex_rendered(&self) -> bool {
        matches!(self, Field::StreamId | Field::FrameNumber | Field::Type)
    }
}

/// One field update published by the session.
#[derive(Debug, Clone)]
pub struct FieldUpdate {
    /// Which field changed.
    pub field: Field,
    /// New text value.
    pub value: String,
}

impl FieldUpdate {
    /// Create a field update.
    pub fn new(field: Field, value: impl Into<String>) -> Self {
        FieldUpdate {
            field,
            value: value.into(),
        }
    }
}

/// Render a field value the way display front ends show it: numeric
/// identifier fields get a `0x` hexadecimal prefix, everything else is
/// passed through unchanged.
pub fn render_value(field: Field, value: &str) -> String {
    if field.is_hex_rendered() {
        if let Ok(n) = value.parse::<u64>() {
            return format!("0x{n:X}");
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_listed_once() {
        assert_eq!(Field::ALL.len(), 14);
        for (i, a) in Field::ALL.iter().enumerate() {
            for b in &Field::ALL[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Field::StreamId.label(), "Stream ID");
        assert_eq!(Field::Destination.label(), "Destination");
        assert_eq!(Field::Meta.label(), "Metadata");
        assert_eq!(
            Field::PacketStreamIndicator.label(),
            "Packet Stream Indicator"
        );
    }

    #[test]
    fn test_hex_rendered_set() {
        assert!(Field::StreamId.is_hex_rendered());
        assert!(Field::FrameNumber.is_hex_rendered());
        assert!(Field::Type.is_hex_rendered());
        assert!(!Field::Source.is_hex_rendered());
        assert!(!Field::Payload.is_hex_rendered());
        assert!(!Field::Status.is_hex_rendered());
    }

    #[test]
    fn test_render_value_hex_fields() {
        assert_eq!(render_value(Field::StreamId, "43981"), "0xABCD");
        assert_eq!(render_value(Field::FrameNumber, "5"), "0x5");
        assert_eq!(render_value(Field::Type, "5"), "0x5");
        // Non-numeric text falls through unchanged.
        assert_eq!(render_value(Field::StreamId, "n/a"), "n/a");
    }

    #[test]
    fn test_render_value_passthrough() {
        assert_eq!(render_value(Field::Source, "N0CALL"), "N0CALL");
        assert_eq!(render_value(Field::Payload, "00ff"), "00ff");
    }
}
