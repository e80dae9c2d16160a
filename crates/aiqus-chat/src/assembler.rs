// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the message sequence sent with a completion request.

use aiqus_config::ChatSettings;
use aiqus_core::{HistoryStore, HistoryTurn, Message};
use tracing::{debug, warn};

/// Produces the ordered messages for one request.
///
/// A non-empty `explicit` sequence is used verbatim. Otherwise the prior turns
/// of `conversation_id` are replayed after the system prompt, followed by the
/// current query. A failing history store counts as a conversation with no
/// prior turns.
pub async fn assemble(
    history: &dyn HistoryStore,
    settings: &ChatSettings,
    query: &str,
    conversation_id: Option<&str>,
    explicit: Option<Vec<Message>>,
) -> Vec<Message> {
    if let Some(messages) = explicit.filter(|m| !m.is_empty()) {
        debug!(count = messages.len(), "using caller-supplied messages");
        return messages;
    }

    let prior = match conversation_id {
        Some(id) => match history.turns_for(id).await {
            Ok(turns) => turns,
            Err(e) => {
                warn!(conversation_id = id, error = %e, "history lookup failed, starting without context");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    build_messages(settings.system_prompt(), prior, query)
}

/// Pure part of [`assemble`]: system prompt, replayed turns, then the query.
///
/// Turns are ordered by timestamp; ties keep their storage order. Turns
/// without an answer contribute only their user message.
pub fn build_messages(
    system_prompt: Option<&str>,
    mut prior: Vec<HistoryTurn>,
    query: &str,
) -> Vec<Message> {
    prior.sort_by_key(|turn| turn.timestamp);

    let mut messages = Vec::with_capacity(prior.len() * 2 + 2);
    if let Some(prompt) = system_prompt {
        messages.push(Message::system(prompt));
    }
    for turn in prior {
        messages.push(Message::user(turn.query));
        if let Some(answer) = turn.answer.filter(|a| !a.is_empty()) {
            messages.push(Message::assistant(answer));
        }
    }
    messages.push(Message::user(query));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiqus_core::{AiqusError, Role};
    use async_trait::async_trait;

    struct FixedHistory(Vec<HistoryTurn>);

    #[async_trait]
    impl HistoryStore for FixedHistory {
        async fn chat_history(&self) -> Result<Vec<HistoryTurn>, AiqusError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenHistory;

    #[async_trait]
    impl HistoryStore for BrokenHistory {
        async fn chat_history(&self) -> Result<Vec<HistoryTurn>, AiqusError> {
            Err(AiqusError::History {
                source: Box::new(std::io::Error::other("disk on fire")),
            })
        }
    }

    fn turn(conversation: &str, query: &str, answer: Option<&str>, ts: i64) -> HistoryTurn {
        HistoryTurn {
            conversation_id: conversation.into(),
            query: query.into(),
            answer: answer.map(Into::into),
            timestamp: ts,
        }
    }

    fn settings() -> ChatSettings {
        ChatSettings::new("http://localhost").with_system_prompt("S")
    }

    #[tokio::test]
    async fn new_conversation_is_system_then_query() {
        let messages = assemble(&FixedHistory(vec![]), &settings(), "hello", None, None).await;
        assert_eq!(messages, vec![Message::system("S"), Message::user("hello")]);
    }

    #[tokio::test]
    async fn replays_prior_turns_of_the_conversation() {
        let history = FixedHistory(vec![
            turn("C", "a", Some("b"), 10),
            turn("other", "x", Some("y"), 5),
        ]);
        let messages = assemble(&history, &settings(), "c", Some("C"), None).await;
        assert_eq!(
            messages,
            vec![
                Message::system("S"),
                Message::user("a"),
                Message::assistant("b"),
                Message::user("c"),
            ]
        );
    }

    #[tokio::test]
    async fn explicit_messages_are_used_verbatim() {
        let explicit = vec![Message::user("only this")];
        let history = FixedHistory(vec![turn("C", "a", Some("b"), 1)]);
        let messages = assemble(&history, &settings(), "ignored", Some("C"), Some(explicit.clone())).await;
        assert_eq!(messages, explicit);
    }

    #[tokio::test]
    async fn empty_explicit_messages_fall_back_to_assembly() {
        let messages = assemble(&FixedHistory(vec![]), &settings(), "q", None, Some(vec![])).await;
        assert_eq!(messages, vec![Message::system("S"), Message::user("q")]);
    }

    #[tokio::test]
    async fn history_failure_means_no_prior_turns() {
        let messages = assemble(&BrokenHistory, &settings(), "q", Some("C"), None).await;
        assert_eq!(messages, vec![Message::system("S"), Message::user("q")]);
    }

    #[test]
    fn no_system_prompt_means_no_system_message() {
        let messages = build_messages(None, vec![], "q");
        assert_eq!(messages, vec![Message::user("q")]);
    }

    #[test]
    fn turns_are_sorted_stably_by_timestamp() {
        let prior = vec![
            turn("C", "third", Some("3"), 30),
            turn("C", "first", Some("1"), 10),
            turn("C", "second-a", Some("2a"), 20),
            turn("C", "second-b", Some("2b"), 20),
        ];
        let users: Vec<_> = build_messages(None, prior, "now")
            .into_iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content)
            .collect();
        assert_eq!(users, vec!["first", "second-a", "second-b", "third", "now"]);
    }

    #[test]
    fn never_emits_empty_assistant_messages() {
        let prior = vec![
            turn("C", "unanswered", None, 1),
            turn("C", "blank", Some(""), 2),
        ];
        let messages = build_messages(Some("S"), prior, "q");
        assert!(
            messages
                .iter()
                .all(|m| m.role != Role::Assistant || !m.content.is_empty())
        );
        assert_eq!(messages.len(), 4);
    }
}
