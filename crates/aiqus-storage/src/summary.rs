// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation listing shared by the history stores.

use std::collections::HashMap;

use aiqus_core::SessionRecord;

/// One line of a conversation listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub conversation_id: String,
    /// Query of the earliest turn.
    pub title: String,
    pub turns: usize,
    /// Timestamp of the most recent turn, in milliseconds.
    pub last_activity: i64,
}

/// Groups records by conversation, most recently active first.
pub fn summarize(records: &[SessionRecord]) -> Vec<ConversationSummary> {
    let mut by_id: HashMap<&str, ConversationSummary> = HashMap::new();
    let mut first_seen: HashMap<&str, i64> = HashMap::new();

    for record in records {
        let entry = by_id
            .entry(record.conversation_id.as_str())
            .or_insert_with(|| ConversationSummary {
                conversation_id: record.conversation_id.clone(),
                title: record.query.clone(),
                turns: 0,
                last_activity: record.timestamp,
            });
        entry.turns += 1;
        entry.last_activity = entry.last_activity.max(record.timestamp);

        let earliest = first_seen
            .entry(record.conversation_id.as_str())
            .or_insert(record.timestamp);
        if record.timestamp < *earliest {
            *earliest = record.timestamp;
            entry.title = record.query.clone();
        }
    }

    let mut summaries: Vec<_> = by_id.into_values().collect();
    summaries.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then_with(|| a.conversation_id.cmp(&b.conversation_id))
    });
    summaries
}

/// Records of one conversation in timestamp order; ties keep storage order.
pub(crate) fn conversation_records(records: &[SessionRecord], conversation_id: &str) -> Vec<SessionRecord> {
    let mut turns: Vec<_> = records
        .iter()
        .filter(|r| r.conversation_id == conversation_id)
        .cloned()
        .collect();
    turns.sort_by_key(|r| r.timestamp);
    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiqus_core::SearchType;

    fn record(conversation: &str, query: &str, ts: i64) -> SessionRecord {
        let mut r = SessionRecord::new(query, SearchType::Chat, "m", vec![], Some(conversation.into()));
        r.timestamp = ts;
        r
    }

    #[test]
    fn groups_and_orders_by_recent_activity() {
        let records = vec![
            record("a", "second", 20),
            record("a", "first", 10),
            record("b", "only", 15),
        ];
        let summaries = summarize(&records);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].conversation_id, "a");
        assert_eq!(summaries[0].title, "first");
        assert_eq!(summaries[0].turns, 2);
        assert_eq!(summaries[0].last_activity, 20);
        assert_eq!(summaries[1].conversation_id, "b");
    }

    #[test]
    fn conversation_records_are_time_ordered() {
        let records = vec![record("a", "2", 2), record("b", "x", 0), record("a", "1", 1)];
        let queries: Vec<_> = conversation_records(&records, "a")
            .into_iter()
            .map(|r| r.query)
            .collect();
        assert_eq!(queries, vec!["1", "2"]);
    }
}
