// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History persisted as a single JSON array document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use aiqus_core::{AiqusError, HistoryStore, HistoryTurn, SessionRecord};

use crate::summary::{ConversationSummary, conversation_records, summarize};

fn history_err(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> AiqusError {
    AiqusError::History {
        source: source.into(),
    }
}

/// File-backed store of finished session records.
///
/// The whole document is rewritten on every update: written to a sibling
/// temp file, then renamed over the original. A missing file reads as an
/// empty history. Writers are serialized by an async mutex; concurrent
/// writers in other processes are not coordinated.
pub struct JsonHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored records, in storage order.
    pub async fn records(&self) -> Result<Vec<SessionRecord>, AiqusError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(history_err(e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            history_err(format!(
                "corrupt history file {}: {e}",
                self.path.display()
            ))
        })
    }

    /// Inserts `record`, or replaces the stored record with the same id.
    pub async fn record(&self, record: &SessionRecord) -> Result<(), AiqusError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.records().await?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.write(&records).await?;
        debug!(
            id = %record.id,
            conversation_id = %record.conversation_id,
            total = records.len(),
            "session recorded"
        );
        Ok(())
    }

    /// Records of one conversation, oldest first.
    pub async fn conversation(&self, conversation_id: &str) -> Result<Vec<SessionRecord>, AiqusError> {
        Ok(conversation_records(&self.records().await?, conversation_id))
    }

    /// Every conversation, most recently active first.
    pub async fn conversations(&self) -> Result<Vec<ConversationSummary>, AiqusError> {
        Ok(summarize(&self.records().await?))
    }

    async fn write(&self, records: &[SessionRecord]) -> Result<(), AiqusError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(history_err)?;
        }
        let json = serde_json::to_vec_pretty(records).map_err(history_err)?;

        replace_file(&self.path, &json).await.map_err(history_err)
    }
}

/// Writes `contents` to a sibling temp file, syncs it to disk, then renames
/// it over `path`. A crash leaves either the old or the new document.
async fn replace_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.to_path_buf().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn chat_history(&self) -> Result<Vec<HistoryTurn>, AiqusError> {
        Ok(self.records().await?.iter().map(HistoryTurn::from).collect())
    }
}
