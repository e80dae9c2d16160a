// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming chat completion client.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use aiqus_chat::{ChannelHandler, ChatEvent, ChatOptions, ChatService};
//! use aiqus_config::ChatSettings;
//! # use aiqus_core::{AiqusError, HistoryStore, HistoryTurn};
//! # struct NoHistory;
//! # #[async_trait::async_trait]
//! # impl HistoryStore for NoHistory {
//! #     async fn chat_history(&self) -> Result<Vec<HistoryTurn>, AiqusError> { Ok(vec![]) }
//! # }
//!
//! # async fn run() -> Result<(), AiqusError> {
//! let settings = ChatSettings::new("https://api.openai.com/v1").with_api_key("sk-...");
//! let service = ChatService::new(settings, Arc::new(NoHistory))?;
//!
//! let (handler, mut events) = ChannelHandler::new();
//! let _handle = service.stream_chat("hello", ChatOptions::default(), handler, None);
//! while let Some(event) = events.recv().await {
//!     if let ChatEvent::Fragment(fragment) = event {
//!         print!("{}", fragment.text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod client;
pub mod handle;
pub mod handler;
pub mod request;
pub mod service;

pub use assembler::{assemble, build_messages};
pub use client::CompletionClient;
pub use handle::{CancelHandle, ChatHandle};
pub use handler::{ChannelHandler, ChatEvent, FnHandler};
pub use request::{ChatOptions, CompletionRequest, generate_message_id};
pub use service::ChatService;
