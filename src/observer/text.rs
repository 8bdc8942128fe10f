//! Plain-text observer: one line per field update.

use crate::core::fields::{Field, render_value};
use crate::core::traits::Observer;

/// Prints each field update to stdout as `Label: value`.
///
/// Numeric identifier fields are shown in hexadecimal, same as the
/// dashboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextObserver;

impl Observer for TextObserver {
    fn update(&mut self, field: Field, value: &str) {
        println!("{}: {}", field.label(), render_value(field, value));
    }
}
