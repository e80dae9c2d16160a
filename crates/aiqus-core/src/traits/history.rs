// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History store trait for looking up prior turns of a conversation.

use async_trait::async_trait;

use crate::error::AiqusError;
use crate::types::HistoryTurn;

/// Read-only source of previously completed turns.
///
/// The chat core only ever reads from a history store; persisting finished
/// turns is the embedding application's business.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns every known turn, in storage order.
    async fn chat_history(&self) -> Result<Vec<HistoryTurn>, AiqusError>;

    /// Returns the turns of one conversation, in storage order.
    async fn turns_for(&self, conversation_id: &str) -> Result<Vec<HistoryTurn>, AiqusError> {
        Ok(self
            .chat_history()
            .await?
            .into_iter()
            .filter(|turn| turn.conversation_id == conversation_id)
            .collect())
    }
}
