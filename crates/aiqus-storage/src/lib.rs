// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History persistence for the aiqus chat client.
//!
//! Both stores keep finished [`SessionRecord`](aiqus_core::SessionRecord)s,
//! upsert by record id, and serve them back to the chat core through
//! [`HistoryStore`](aiqus_core::HistoryStore).

pub mod json;
pub mod memory;
pub mod summary;

pub use json::JsonHistoryStore;
pub use memory::MemoryHistoryStore;
pub use summary::{ConversationSummary, summarize};
