// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the seams of the chat core.

pub mod handler;
pub mod history;

pub use handler::ChatHandler;
pub use history::HistoryStore;
