// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aiqus shell` command implementation.
//!
//! Launches an interactive REPL with colored prompt, streaming output,
//! and readline history. Every answered turn is saved, so follow-up
//! questions carry the conversation so far.

use std::sync::Arc;

use aiqus_chat::{CancelHandle, ChatOptions, ChatService};
use aiqus_config::{AiqusConfig, ChatSettings};
use aiqus_core::AiqusError;
use aiqus_storage::JsonHistoryStore;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use crate::ask::spawn_interrupt_watcher;
use crate::printer::TerminalPrinter;

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum ShellInput<'a> {
    Empty,
    Quit,
    NewConversation,
    Model(Option<&'a str>),
    Help,
    Unknown(&'a str),
    Query(&'a str),
}

fn parse_input(line: &str) -> ShellInput<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ShellInput::Empty;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return ShellInput::Query(trimmed);
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (command, None),
    };
    match name {
        "quit" | "exit" => ShellInput::Quit,
        "new" => ShellInput::NewConversation,
        "model" => ShellInput::Model(arg),
        "help" => ShellInput::Help,
        _ => ShellInput::Unknown(trimmed),
    }
}

/// Runs the `aiqus shell` interactive REPL.
pub async fn run_shell(
    config: &AiqusConfig,
    conversation: Option<String>,
    model: Option<String>,
) -> Result<(), AiqusError> {
    let store = Arc::new(JsonHistoryStore::new(&config.storage.history_path));
    let service = ChatService::new(ChatSettings::from(config), store.clone())?;

    let mut conversation = conversation;
    let mut model = model;

    let mut rl = DefaultEditor::new()
        .map_err(|e| AiqusError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.app.name).bold().green());
    println!(
        "Type {} for commands, {} to exit. Ctrl+C stops an answer.\n",
        "/help".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", config.app.name.green());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        match parse_input(&line) {
            ShellInput::Empty => continue,
            ShellInput::Quit => break,
            ShellInput::NewConversation => {
                conversation = None;
                println!("{}", "started a new conversation".dimmed());
            }
            ShellInput::Model(Some(name)) => {
                model = Some(name.to_string());
                println!("{}", format!("model: {name}").dimmed());
            }
            ShellInput::Model(None) => {
                let current = service.settings().resolve_model(model.as_deref());
                println!("{}", format!("model: {current}").dimmed());
            }
            ShellInput::Help => print_help(),
            ShellInput::Unknown(command) => {
                eprintln!("{}: unknown command {command}", "error".red());
            }
            ShellInput::Query(query) => {
                let _ = rl.add_history_entry(&line);
                if let Some(id) =
                    handle_query(&service, &store, query, conversation.clone(), model.clone()).await
                {
                    conversation = Some(id);
                }
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Streams one answer and saves it. Returns the conversation id to continue.
async fn handle_query(
    service: &ChatService,
    store: &JsonHistoryStore,
    query: &str,
    conversation: Option<String>,
    model: Option<String>,
) -> Option<String> {
    let options = ChatOptions {
        model,
        ..ChatOptions::default()
    };

    let cancel = CancelHandle::new();
    let interrupt = spawn_interrupt_watcher(cancel.clone());
    let mut printer = TerminalPrinter::stdio();
    let record = service
        .chat(query, options, &mut printer, conversation, &cancel)
        .await;
    interrupt.abort();

    if cancel.is_cancelled() {
        println!("{}", "(stopped)".dimmed());
    }

    let record = record?;
    if let Err(e) = store.record(&record).await {
        warn!(error = %e, "failed to save session");
        eprintln!("{}: could not save history: {e}", "warning".yellow());
    }
    debug!(conversation_id = %record.conversation_id, "turn saved");
    Some(record.conversation_id)
}

fn print_help() {
    println!("  {}          start a new conversation", "/new".yellow());
    println!("  {}  switch model (no argument shows the current one)", "/model [NAME]".yellow());
    println!("  {}         exit the shell", "/quit".yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_queries_and_commands() {
        assert_eq!(parse_input("   "), ShellInput::Empty);
        assert_eq!(parse_input(" hello there "), ShellInput::Query("hello there"));
        assert_eq!(parse_input("/quit"), ShellInput::Quit);
        assert_eq!(parse_input("/exit"), ShellInput::Quit);
        assert_eq!(parse_input("/new"), ShellInput::NewConversation);
        assert_eq!(parse_input("/help"), ShellInput::Help);
        assert_eq!(parse_input("/model"), ShellInput::Model(None));
        assert_eq!(parse_input("/model  gpt-4o "), ShellInput::Model(Some("gpt-4o")));
        assert_eq!(parse_input("/nope"), ShellInput::Unknown("/nope"));
    }

    #[tokio::test]
    async fn handle_query_saves_and_returns_conversation() {
        use aiqus_test_utils::{TEST_API_KEY, TestHarness, sse_body};

        let harness = TestHarness::builder().build().await.unwrap();
        harness.mount_stream(sse_body(&["ok"])).await;
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonHistoryStore::new(dir.path().join("h.json")));
        let settings = ChatSettings::new(harness.server.uri()).with_api_key(TEST_API_KEY);
        let service = ChatService::new(settings, store.clone()).unwrap();

        let id = handle_query(&service, &store, "hi", None, None).await.unwrap();
        let again = handle_query(&service, &store, "more", Some(id.clone()), None)
            .await
            .unwrap();

        assert_eq!(id, again);
        assert_eq!(store.conversation(&id).await.unwrap().len(), 2);
    }
}
