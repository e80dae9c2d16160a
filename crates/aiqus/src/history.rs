// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aiqus history` and `aiqus models` command implementations.

use aiqus_config::{AiqusConfig, ChatSettings, FALLBACK_MODEL};
use aiqus_core::AiqusError;
use aiqus_storage::{ConversationSummary, JsonHistoryStore};
use colored::Colorize;

const TITLE_WIDTH: usize = 60;

/// Prints the model catalog, marking the default entry.
pub fn run_models(config: &AiqusConfig) {
    let settings = ChatSettings::from(config);
    let default = settings.default_model().map(|m| m.value.as_str());
    for option in settings.models() {
        let marker = if Some(option.value.as_str()) == default {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        println!("{marker} {:<28} {}", option.value, option.label.dimmed());
    }
    if default.is_none() {
        println!("{}", format!("no default set, using {FALLBACK_MODEL}").dimmed());
    }
}

/// Lists conversations, or prints every turn of one conversation.
pub async fn run_history(config: &AiqusConfig, conversation: Option<&str>) -> Result<(), AiqusError> {
    let store = JsonHistoryStore::new(&config.storage.history_path);

    let Some(id) = conversation else {
        let summaries = store.conversations().await?;
        if summaries.is_empty() {
            println!("{}", "no conversations yet".dimmed());
        }
        for summary in &summaries {
            println!("{}", summary_line(summary));
        }
        return Ok(());
    };

    let records = store.conversation(id).await?;
    if records.is_empty() {
        return Err(AiqusError::Internal(format!("no conversation with id {id}")));
    }
    for record in records {
        println!(
            "{} {}",
            format_timestamp(record.timestamp).dimmed(),
            record.model.dimmed()
        );
        println!("{} {}", ">".cyan().bold(), record.query.bold());
        if record.answer.is_empty() {
            println!("{}", "(no answer)".dimmed());
        } else {
            println!("{}", record.answer);
        }
        println!();
    }
    Ok(())
}

fn summary_line(summary: &ConversationSummary) -> String {
    format!(
        "{}  {}  {:>3} turn{}  {}",
        summary.conversation_id.yellow(),
        format_timestamp(summary.last_activity).dimmed(),
        summary.turns,
        if summary.turns == 1 { " " } else { "s" },
        truncate(&summary.title, TITLE_WIDTH)
    )
}

/// Local time for a millisecond timestamp; the raw number if out of range.
fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| millis.to_string())
}

/// Cuts `text` to `max` characters on one line, marking the cut with `…`.
fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max && line.len() == text.len() {
        return line.to_string();
    }
    let kept: String = line.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_single_lines() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_cuts_on_char_boundary() {
        assert_eq!(truncate("ééééé", 3), "éé…");
    }

    #[test]
    fn truncate_marks_dropped_lines() {
        assert_eq!(truncate("first\nsecond", 20), "first…");
    }

    #[test]
    fn summary_line_pluralizes() {
        colored::control::set_override(false);
        let summary = ConversationSummary {
            conversation_id: "abc".into(),
            title: "What is Rust?".into(),
            turns: 1,
            last_activity: 0,
        };
        let line = summary_line(&summary);
        assert!(line.starts_with("abc  "));
        assert!(line.contains("  1 turn "));
        assert!(line.ends_with("What is Rust?"));
    }

    #[tokio::test]
    async fn unknown_conversation_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AiqusConfig::default();
        config.storage.history_path = dir.path().join("h.json").to_string_lossy().into_owned();
        assert!(run_history(&config, Some("missing")).await.is_err());
        assert!(run_history(&config, None).await.is_ok());
    }
}
