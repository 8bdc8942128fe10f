//! Voice frame dispatch: publish, filter, decode, play.

use tracing::{debug, trace, warn};

use crate::core::fields::Field;
use crate::core::traits::{AudioSink, Vocoder};
use crate::observer::FieldPublisher;
use crate::protocol::stream::StreamFrame;

/// Turns parsed stream frames into observer updates and audio.
///
/// Every frame's fields are published before any filtering, so displays
/// track whatever the reflector forwards. Only unencrypted stream-mode
/// voice frames reach the vocoder, and both sub-frames must decode or the
/// whole frame is dropped.
pub struct FrameDispatcher {
    vocoder: Box<dyn Vocoder>,
    sink: Box<dyn AudioSink>,
    publisher: FieldPublisher,
}

impl FrameDispatcher {
    /// Assemble a dispatcher from its collaborators.
    pub fn new(
        vocoder: Box<dyn Vocoder>,
        sink: Box<dyn AudioSink>,
        publisher: FieldPublisher,
    ) -> Self {
        FrameDispatcher {
            vocoder,
            sink,
            publisher,
        }
    }

    /// Process one stream frame.
    pub fn dispatch(&mut self, frame: &StreamFrame) {
        let type_field = frame.type_field();

        trace!(
            stream_id = frame.stream_id,
            frame_number = frame.frame_number,
            dst = %frame.lich.destination,
            src = %frame.lich.source,
            type_code = frame.lich.type_code,
            "stream frame"
        );

        self.publish_fields(frame);

        if !type_field.is_stream() || type_field.is_encrypted() {
            debug!(
                type_code = frame.lich.type_code,
                "frame filtered: packet mode or encrypted"
            );
            self.publisher.status(format!(
                "Ignoring packet-mode or encrypted frame: type {}",
                frame.lich.type_code
            ));
            return;
        }

        if !type_field.carries_voice() {
            debug!(type_code = frame.lich.type_code, "frame filtered: not voice");
            self.publisher.status(format!(
                "Ignoring non-voice frame: type {}",
                frame.lich.type_code
            ));
            return;
        }

        let [first, second] = frame.subframes();
        let mut samples = match self.vocoder.decode(first) {
            Ok(samples) => samples,
            Err(e) => {
                warn!(error = %e, "first voice sub-frame dropped");
                self.publisher
                    .error(format!("failed to decode first voice sub-frame: {e}"));
                return;
            }
        };
        match self.vocoder.decode(second) {
            Ok(more) => samples.extend_from_slice(&more),
            Err(e) => {
                warn!(error = %e, "second voice sub-frame dropped");
                self.publisher
                    .error(format!("failed to decode second voice sub-frame: {e}"));
                return;
            }
        }

        if let Err(e) = self.sink.write(&samples) {
            warn!(error = %e, "sample block dropped");
            self.publisher.error(format!("failed to play audio: {e}"));
        }
    }

    fn publish_fields(&self, frame: &StreamFrame) {
        let type_field = frame.type_field();
        let p = &self.publisher;
        p.update(Field::StreamId, frame.stream_id.to_string());
        p.update(Field::FrameNumber, frame.frame_number.to_string());
        p.update(Field::Destination, frame.lich.destination.as_str());
        p.update(Field::Source, frame.lich.source.as_str());
        p.update(Field::Type, frame.lich.type_code.to_string());
        p.update(Field::Meta, hex_string(&frame.lich.meta));
        p.update(Field::Payload, hex_string(&frame.payload));
        p.update(
            Field::PacketStreamIndicator,
            type_field.stream_indicator.to_string(),
        );
        p.update(Field::DataTypeIndicator, type_field.data_type.to_string());
        p.update(Field::EncryptionType, type_field.encryption_type.to_string());
        p.update(
            Field::EncryptionSubtype,
            type_field.encryption_subtype.to_string(),
        );
        p.update(
            Field::ChannelAccessNumber,
            type_field.channel_access_number.to_string(),
        );
    }
}

/// Lowercase hex rendering of a byte slice.
fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::core::constants::{META_SIZE, PAYLOAD_SIZE};
    use crate::core::error::AudioError;
    use crate::core::fields::FieldUpdate;
    use crate::observer;
    use crate::protocol::stream::Lich;

    #[derive(Clone, Default)]
    struct TestVocoder {
        decoded: Arc<Mutex<Vec<Vec<u8>>>>,
        fail: bool,
    }

    impl Vocoder for TestVocoder {
        fn samples_per_subframe(&self) -> usize {
            160
        }

        fn decode(&mut self, subframe: &[u8]) -> Result<Vec<i16>, AudioError> {
            self.decoded.lock().unwrap().push(subframe.to_vec());
            if self.fail {
                return Err(AudioError::Decode("forced failure".into()));
            }
            Ok(vec![subframe[0] as i16; 160])
        }
    }

    #[derive(Clone, Default)]
    struct TestSink {
        blocks: Arc<Mutex<Vec<Vec<i16>>>>,
        fail: bool,
    }

    impl AudioSink for TestSink {
        fn write(&mut self, samples: &[i16]) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::Sink("forced failure".into()));
            }
            self.blocks.lock().unwrap().push(samples.to_vec());
            Ok(())
        }
    }

    fn voice_frame(type_code: u16) -> StreamFrame {
        let mut payload = [0u8; PAYLOAD_SIZE];
        payload[0] = 0x11;
        payload[8] = 0x22;
        StreamFrame {
            stream_id: 7,
            lich: Lich {
                destination: "N0CALL".to_string(),
                source: "AB1CDE".to_string(),
                type_code,
                meta: [0xAB; META_SIZE],
            },
            frame_number: 1,
            payload,
        }
    }

    fn dispatcher_with(
        vocoder: TestVocoder,
        sink: TestSink,
    ) -> (FrameDispatcher, FieldPublisher) {
        let (publisher, _rx) = observer::channel();
        let dispatcher =
            FrameDispatcher::new(Box::new(vocoder), Box::new(sink), publisher.clone());
        (dispatcher, publisher)
    }

    fn drain(
        rx: &mut tokio::sync::broadcast::Receiver<FieldUpdate>,
    ) -> Vec<(Field, String)> {
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push((update.field, update.value));
        }
        updates
    }

    #[test]
    fn test_voice_frame_reaches_sink_in_order() {
        let vocoder = TestVocoder::default();
        let sink = TestSink::default();
        let decoded = Arc::clone(&vocoder.decoded);
        let blocks = Arc::clone(&sink.blocks);
        let (mut dispatcher, _publisher) = dispatcher_with(vocoder, sink);

        // Voice, stream mode, unencrypted.
        let frame = voice_frame(0x0005);
        dispatcher.dispatch(&frame);

        let decoded = decoded.lock().unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0], frame.payload[..8].to_vec());
        assert_eq!(decoded[1], frame.payload[8..].to_vec());

        let blocks = blocks.lock().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 320);
        assert_eq!(blocks[0][0], 0x11);
        assert_eq!(blocks[0][160], 0x22);
    }

    #[test]
    fn test_voice_and_data_frame_decoded() {
        let vocoder = TestVocoder::default();
        let decoded = Arc::clone(&vocoder.decoded);
        let (mut dispatcher, _publisher) = dispatcher_with(vocoder, TestSink::default());

        // Data type 3: voice + data.
        dispatcher.dispatch(&voice_frame(0x0007));
        assert_eq!(decoded.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_packet_mode_frame_filtered() {
        let vocoder = TestVocoder::default();
        let decoded = Arc::clone(&vocoder.decoded);
        let (mut dispatcher, publisher) = dispatcher_with(vocoder, TestSink::default());
        let mut rx = publisher.subscribe();

        // Stream indicator clear.
        dispatcher.dispatch(&voice_frame(0x0004));

        assert!(decoded.lock().unwrap().is_empty());
        let updates = drain(&mut rx);
        let status = updates.iter().find(|(f, _)| *f == Field::Status).unwrap();
        assert_eq!(status.1, "Ignoring packet-mode or encrypted frame: type 4");
    }

    #[test]
    fn test_encrypted_frame_filtered() {
        let vocoder = TestVocoder::default();
        let decoded = Arc::clone(&vocoder.decoded);
        let (mut dispatcher, _publisher) = dispatcher_with(vocoder, TestSink::default());

        // Voice stream with encryption type 1.
        dispatcher.dispatch(&voice_frame(0x0005 | (1 << 3)));
        assert!(decoded.lock().unwrap().is_empty());
    }

    #[test]
    fn test_non_voice_frame_filtered() {
        let vocoder = TestVocoder::default();
        let decoded = Arc::clone(&vocoder.decoded);
        let (mut dispatcher, publisher) = dispatcher_with(vocoder, TestSink::default());
        let mut rx = publisher.subscribe();

        // Stream mode, data type 1: data only, no vocoder payload.
        dispatcher.dispatch(&voice_frame(0x0003));
        assert!(decoded.lock().unwrap().is_empty());

        // Data type 0 is filtered the same way.
        dispatcher.dispatch(&voice_frame(0x0001));
        assert!(decoded.lock().unwrap().is_empty());

        let updates = drain(&mut rx);
        let status = updates.iter().find(|(f, _)| *f == Field::Status).unwrap();
        assert_eq!(status.1, "Ignoring non-voice frame: type 3");
    }

    #[test]
    fn test_fields_published_before_filtering() {
        let (mut dispatcher, publisher) =
            dispatcher_with(TestVocoder::default(), TestSink::default());
        let mut rx = publisher.subscribe();

        dispatcher.dispatch(&voice_frame(0x0004));

        let updates = drain(&mut rx);
        let fields: Vec<Field> = updates.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            vec![
                Field::StreamId,
                Field::FrameNumber,
                Field::Destination,
                Field::Source,
                Field::Type,
                Field::Meta,
                Field::Payload,
                Field::PacketStreamIndicator,
                Field::DataTypeIndicator,
                Field::EncryptionType,
                Field::EncryptionSubtype,
                Field::ChannelAccessNumber,
                Field::Status,
            ]
        );
        assert_eq!(updates[0].1, "7");
        assert_eq!(updates[2].1, "N0CALL");
        assert_eq!(updates[5].1, hex::encode([0xAB; META_SIZE]));
    }

    #[test]
    fn test_decode_failure_drops_whole_frame() {
        let vocoder = TestVocoder {
            fail: true,
            ..TestVocoder::default()
        };
        let sink = TestSink::default();
        let decoded = Arc::clone(&vocoder.decoded);
        let blocks = Arc::clone(&sink.blocks);
        let (mut dispatcher, publisher) = dispatcher_with(vocoder, sink);
        let mut rx = publisher.subscribe();

        dispatcher.dispatch(&voice_frame(0x0005));

        // First sub-frame fails; the second is never attempted.
        assert_eq!(decoded.lock().unwrap().len(), 1);
        assert!(blocks.lock().unwrap().is_empty());
        let updates = drain(&mut rx);
        let error = updates.iter().find(|(f, _)| *f == Field::Error).unwrap();
        assert!(error.1.contains("first voice sub-frame"));
    }

    #[test]
    fn test_sink_failure_is_absorbed() {
        let sink = TestSink {
            fail: true,
            ..TestSink::default()
        };
        let (mut dispatcher, publisher) = dispatcher_with(TestVocoder::default(), sink);
        let mut rx = publisher.subscribe();

        dispatcher.dispatch(&voice_frame(0x0005));

        let updates = drain(&mut rx);
        let error = updates.iter().find(|(f, _)| *f == Field::Error).unwrap();
        assert!(error.1.contains("failed to play audio"));
    }

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string(&[]), "");
        assert_eq!(hex_string(&[0x00, 0xAB, 0x5D]), "00ab5d");
        assert_eq!(hex_string(&[0x00, 0xAB, 0x5D]), hex::encode([0x00, 0xAB, 0x5D]));
    }
}
