// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the aiqus chat client.

use thiserror::Error;

/// The primary error type used across the aiqus crates.
///
/// Only [`Config`](AiqusError::Config) and [`Transport`](AiqusError::Transport)
/// ever reach a caller's error callback. [`Cancelled`](AiqusError::Cancelled) and
/// [`RecordParse`](AiqusError::RecordParse) are absorbed inside the stream pipeline.
#[derive(Debug, Error)]
pub enum AiqusError {
    /// Configuration errors (missing credential, invalid endpoint, bad catalog).
    #[error("configuration error: {0}")]
    Config(String),

    /// Network failure, non-success HTTP status, or a broken response body.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status code when the server answered with a non-success status.
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller aborted the request.
    #[error("request cancelled")]
    Cancelled,

    /// A single streamed record could not be parsed.
    #[error("malformed stream record: {message}")]
    RecordParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// History store errors (unreadable file, corrupt document).
    #[error("history error: {source}")]
    History {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AiqusError {
    /// Builds a transport error without an HTTP status.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AiqusError::Transport {
            message: message.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true when the error represents a caller-initiated abort.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AiqusError::Cancelled)
    }

    /// Returns true for connection, status, and body read failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, AiqusError::Transport { .. })
    }

    /// HTTP status attached to a transport error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AiqusError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}
