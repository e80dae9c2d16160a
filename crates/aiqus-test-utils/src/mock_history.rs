// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory history store for deterministic tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use aiqus_core::{AiqusError, HistoryStore, HistoryTurn};

/// A `HistoryStore` backed by a vector, optionally set to fail every lookup.
#[derive(Default)]
pub struct MockHistory {
    turns: Mutex<Vec<HistoryTurn>>,
    failing: bool,
}

impl MockHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `turns`, returned in the given order.
    pub fn with_turns(turns: Vec<HistoryTurn>) -> Self {
        Self {
            turns: Mutex::new(turns),
            failing: false,
        }
    }

    /// A store whose every lookup returns a history error.
    pub fn failing() -> Self {
        Self {
            turns: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub async fn push(&self, turn: HistoryTurn) {
        self.turns.lock().await.push(turn);
    }

    /// Convenience constructor for a turn.
    pub fn turn(conversation_id: &str, query: &str, answer: Option<&str>, timestamp: i64) -> HistoryTurn {
        HistoryTurn {
            conversation_id: conversation_id.to_string(),
            query: query.to_string(),
            answer: answer.map(str::to_string),
            timestamp,
        }
    }
}

#[async_trait]
impl HistoryStore for MockHistory {
    async fn chat_history(&self) -> Result<Vec<HistoryTurn>, AiqusError> {
        if self.failing {
            return Err(AiqusError::History {
                source: "mock history configured to fail".into(),
            });
        }
        Ok(self.turns.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn filters_by_conversation() {
        let history = MockHistory::with_turns(vec![
            MockHistory::turn("a", "q1", Some("r1"), 1),
            MockHistory::turn("b", "q2", None, 2),
        ]);
        history.push(MockHistory::turn("a", "q3", None, 3)).await;

        let turns = history.turns_for("a").await.unwrap();
        let queries: Vec<_> = turns.iter().map(|t| t.query.as_str()).collect();
        assert_eq!(queries, vec!["q1", "q3"]);
    }

    #[tokio::test]
    async fn failing_store_errors() {
        let err = MockHistory::failing().chat_history().await.unwrap_err();
        assert!(matches!(err, AiqusError::History { .. }));
    }
}
