// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral history kept in process memory.

use async_trait::async_trait;
use tokio::sync::RwLock;

use aiqus_core::{AiqusError, HistoryStore, HistoryTurn, SessionRecord};

use crate::summary::{ConversationSummary, conversation_records, summarize};

/// Same surface as [`JsonHistoryStore`](crate::JsonHistoryStore), lost on drop.
#[derive(Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<SessionRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<SessionRecord> {
        self.records.read().await.clone()
    }

    /// Inserts `record`, or replaces the stored record with the same id.
    pub async fn record(&self, record: &SessionRecord) {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
    }

    pub async fn conversation(&self, conversation_id: &str) -> Vec<SessionRecord> {
        conversation_records(&self.records.read().await, conversation_id)
    }

    pub async fn conversations(&self) -> Vec<ConversationSummary> {
        summarize(&self.records.read().await)
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn chat_history(&self) -> Result<Vec<HistoryTurn>, AiqusError> {
        Ok(self.records.read().await.iter().map(HistoryTurn::from).collect())
    }
}
