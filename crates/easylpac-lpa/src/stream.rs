//! Result extraction from the driver's stdout
//!
//! The driver prints one JSON record per line, interleaved with progress
//! records and occasional non-JSON noise. Only records whose `type` is
//! [`RESULT_TYPE`] carry the outcome. Scanning is deliberately tolerant: a
//! line that does not decode is skipped, never reported.

use serde::Deserialize;
use serde_json::Value;
use std::io::{self, BufRead};

use crate::error::LpacError;
use crate::render::render_failure;

/// `type` discriminator of the terminal result record.
pub const RESULT_TYPE: &str = "lpa";

/// One decoded output line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Payload,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Payload {
    /// `0` on success.
    pub code: i64,
    pub message: Option<String>,
    pub data: Value,
}

impl Envelope {
    #[must_use]
    pub fn is_result(&self) -> bool {
        self.kind == RESULT_TYPE
    }
}

/// Lazily decode each line of `reader`.
///
/// Yields `Ok(None)` for lines that are not an envelope and `Err` only when
/// reading fails. Lines are split on `\n` with a trailing `\r` removed, and
/// decoded from raw bytes so invalid UTF-8 noise is skipped like any other
/// malformed line.
pub fn envelopes<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<Option<Envelope>>> {
    reader
        .split(b'\n')
        .map(|line| line.map(|bytes| decode_line(&bytes)))
}

fn decode_line(line: &[u8]) -> Option<Envelope> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    serde_json::from_slice(line).ok()
}

/// Scan the whole stream for the outcome of one invocation.
///
/// - The last successful result record wins; scanning always runs to the end
///   of the stream unless a failure is seen.
/// - The first failing result record stops the scan and is rendered into
///   [`LpacError::Lpa`].
/// - No result record at all yields `Ok(None)`.
/// - A read error yields [`LpacError::Scan`].
pub fn parse_result<R: BufRead>(reader: R) -> Result<Option<Value>, LpacError> {
    let mut result = None;

    for envelope in envelopes(reader) {
        let Some(envelope) = envelope.map_err(LpacError::Scan)? else {
            continue;
        };
        if !envelope.is_result() {
            continue;
        }

        let Payload {
            code,
            message,
            data,
        } = envelope.payload;

        if code != 0 {
            return Err(render_failure(code, message.as_deref().unwrap_or_default(), &data).into());
        }
        result = Some(data);
    }

    Ok(result)
}
