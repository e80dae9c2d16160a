// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of `data: ` records from an OpenAI-style completion stream.
//!
//! ```text
//! data: {"choices":[{"index":0,"delta":{"content":"Hel"}}]}
//! data: {"choices":[{"index":0,"delta":{"content":"lo"}}]}
//! data: [DONE]
//! ```

use aiqus_core::AiqusError;
use serde_json::Value;
use tracing::{debug, warn};

/// Marker that starts every line carrying a record.
pub const DATA_PREFIX: &str = "data: ";

/// Payload signalling that no more content will follow.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Longest slice of an offending line copied into a log event.
const LOG_PREVIEW_CHARS: usize = 120;

/// What a single line contributes to the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    /// Incremental answer text.
    Content(String),
    /// The `[DONE]` sentinel.
    Done,
    /// Nothing: not a data line, or a record without text.
    Skip,
}

/// Classifies one decoded line.
///
/// Returns [`AiqusError::RecordParse`] when a data line carries a payload that
/// is not valid JSON. Any JSON shape without `choices[0].delta.content` is a
/// [`Delta::Skip`].
pub fn parse_line(line: &str) -> Result<Delta, AiqusError> {
    let Some(payload) = line.trim().strip_prefix(DATA_PREFIX) else {
        return Ok(Delta::Skip);
    };
    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return Ok(Delta::Done);
    }
    if payload.is_empty() {
        return Ok(Delta::Skip);
    }

    let record: Value = serde_json::from_str(payload).map_err(|e| AiqusError::RecordParse {
        message: format!("invalid JSON in data record: {e}"),
        source: Some(Box::new(e)),
    })?;

    if let Some(reason) = record
        .pointer("/choices/0/finish_reason")
        .and_then(Value::as_str)
    {
        debug!(finish_reason = reason, "choice finished");
    }

    match record
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
    {
        Some(text) if !text.is_empty() => Ok(Delta::Content(text.to_string())),
        _ => Ok(Delta::Skip),
    }
}

/// Stateful wrapper around [`parse_line`] used by the stream pipeline.
///
/// Malformed records are logged and dropped so that one bad line never aborts
/// the stream. The parser remembers whether `[DONE]` was seen and how many
/// records were dropped.
#[derive(Debug, Default)]
pub struct DeltaParser {
    saw_done: bool,
    malformed: usize,
}

impl DeltaParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text fragment carried by `line`, if any.
    pub fn feed(&mut self, line: &str) -> Option<String> {
        match parse_line(line) {
            Ok(Delta::Content(text)) => Some(text),
            Ok(Delta::Done) => {
                self.saw_done = true;
                None
            }
            Ok(Delta::Skip) => None,
            Err(err) => {
                self.malformed += 1;
                warn!(
                    error = %err,
                    line = preview(line),
                    "skipping malformed stream record"
                );
                None
            }
        }
    }

    /// True once the `[DONE]` sentinel has been seen.
    pub fn saw_done(&self) -> bool {
        self.saw_done
    }

    /// Number of data records dropped because they failed to parse.
    pub fn malformed(&self) -> usize {
        self.malformed
    }
}

fn preview(line: &str) -> &str {
    match line.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
