// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the aiqus streaming chat client.
//!
//! This crate provides the error type, the conversation data model, and the
//! collaborator traits (history lookup and event callbacks) shared by the
//! stream pipeline, the orchestrator, and the storage backends.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::AiqusError;
pub use traits::{ChatHandler, HistoryStore};
pub use types::{
    Attachment, Fragment, HistoryTurn, Message, Role, SearchType, SessionRecord,
};
