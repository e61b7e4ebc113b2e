//! Rendering of driver-reported failures
//!
//! A failing result record carries `data` as JSON inside a JSON string. The
//! text shown to the user is produced by a short chain where each stage falls
//! back to the previous stage's value:
//!
//! 1. decode `data` as a string (otherwise show the raw JSON),
//! 2. decode that string as a JSON object (otherwise show the string),
//! 3. pretty-print the object with two-space indentation.
//!
//! The result is wrapped to [`DISPLAY_WIDTH`] terminal columns, counting each
//! character by its East Asian width so CJK text wraps at the same visual edge
//! as ASCII.

use serde_json::{Map, Value};
use unicode_width::UnicodeWidthChar;

use crate::error::LpaFailure;

/// Column limit for wrapped diagnostic text.
pub const DISPLAY_WIDTH: usize = 90;

/// Build the failure for a result record with a non-zero `code`.
#[must_use]
pub fn render_failure(code: i64, message: &str, data: &Value) -> LpaFailure {
    LpaFailure {
        code,
        function: message.to_string(),
        data: wrap_display(&display_text(data), DISPLAY_WIDTH),
    }
}

/// Unwrap a possibly double-encoded `data` value into display text.
#[must_use]
pub fn display_text(data: &Value) -> String {
    decode_outer(data)
        .map(|inner| pretty_object(&inner).unwrap_or(inner))
        .unwrap_or_else(|raw| raw)
}

/// First layer: the JSON string. `Err` carries the raw fallback text.
fn decode_outer(data: &Value) -> Result<String, String> {
    match data {
        Value::String(inner) => Ok(inner.clone()),
        Value::Null => Err(String::new()),
        other => Err(other.to_string()),
    }
}

/// Second layer: a JSON object inside the string.
fn pretty_object(text: &str) -> Option<String> {
    let object: Map<String, Value> = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&object).ok()
}

/// Hard-wrap `text` so no output line is wider than `max_width` columns.
///
/// Existing line breaks are kept, including empty lines. Characters without a
/// defined width (control characters) count as zero columns. A single character
/// wider than `max_width` still gets a line of its own.
#[must_use]
pub fn wrap_display(text: &str, max_width: usize) -> String {
    let mut wrapped: Vec<String> = Vec::new();

    for line in text.split('\n') {
        let mut current = String::new();
        let mut width = 0;

        for ch in line.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if width + ch_width > max_width && !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
                width = 0;
            }
            current.push(ch);
            width += ch_width;
        }

        wrapped.push(current);
    }

    wrapped.join("\n")
}
