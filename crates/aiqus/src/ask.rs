// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aiqus ask` command implementation.

use std::sync::Arc;

use aiqus_chat::{CancelHandle, ChatOptions, ChatService};
use aiqus_config::{AiqusConfig, ChatSettings};
use aiqus_core::AiqusError;
use aiqus_storage::JsonHistoryStore;
use colored::Colorize;
use tracing::warn;

use crate::printer::TerminalPrinter;

/// Arguments of a one-shot question.
#[derive(Debug, Clone, Default)]
pub struct AskArgs {
    pub query: String,
    pub conversation: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub save: bool,
}

impl AskArgs {
    fn options(&self) -> ChatOptions {
        ChatOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            ..ChatOptions::default()
        }
    }
}

/// Streams one answer to stdout and records it. Returns whether the request
/// succeeded; Ctrl+C stops the stream and keeps the partial answer.
pub async fn run_ask(config: &AiqusConfig, args: AskArgs) -> Result<bool, AiqusError> {
    let store = Arc::new(JsonHistoryStore::new(&config.storage.history_path));
    let service = ChatService::new(ChatSettings::from(config), store.clone())?;

    let cancel = CancelHandle::new();
    let interrupt = spawn_interrupt_watcher(cancel.clone());

    let mut printer = TerminalPrinter::stdio();
    let record = service
        .chat(
            args.query.clone(),
            args.options(),
            &mut printer,
            args.conversation.clone(),
            &cancel,
        )
        .await;
    interrupt.abort();

    if let Some(record) = &record {
        if args.save {
            if let Err(e) = store.record(record).await {
                warn!(error = %e, "failed to save session");
                eprintln!("{}: could not save history: {e}", "warning".yellow());
            }
        }
        eprintln!("{}", format!("conversation: {}", record.conversation_id).dimmed());
    }

    Ok(record.is_some() && !printer.failed())
}

/// Cancels `cancel` on the first Ctrl+C.
pub(crate) fn spawn_interrupt_watcher(cancel: CancelHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    })
}
