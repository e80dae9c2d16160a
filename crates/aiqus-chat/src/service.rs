// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream orchestration.
//!
//! [`ChatService`] drives one request from query to finalized session record:
//! resolve the model, assemble messages, post the request, then pipe the body
//! through the line decoder, the delta parser, and the answer accumulator while
//! reporting progress to a [`ChatHandler`].
//!
//! Outcomes as seen by the handler:
//! - graceful end: `on_finish` once with the full answer
//! - transport failure: `on_error`, then `on_finish` with the partial answer
//!   if any text had arrived
//! - cancellation: no `on_error`; `on_finish` with the partial answer if any
//!   text had arrived

use std::sync::Arc;

use aiqus_config::ChatSettings;
use aiqus_core::{AiqusError, ChatHandler, HistoryStore, SearchType, SessionRecord};
use aiqus_stream::{AnswerAccumulator, DeltaParser, LineStream};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::assembler;
use crate::client::CompletionClient;
use crate::handle::{CancelHandle, ChatHandle};
use crate::request::{ChatOptions, CompletionRequest, generate_message_id};

/// Entry point for streamed chat requests.
///
/// Cheap to clone; clones share the HTTP connection pool, settings, and
/// history store. Requests never share mutable state.
#[derive(Clone)]
pub struct ChatService {
    settings: Arc<ChatSettings>,
    history: Arc<dyn HistoryStore>,
    client: CompletionClient,
}

/// A request that passed the credential check and got its identifiers.
struct Prepared {
    record: SessionRecord,
    api_key: String,
    options: ChatOptions,
    conversation_id: Option<String>,
}

impl ChatService {
    pub fn new(settings: ChatSettings, history: Arc<dyn HistoryStore>) -> Result<Self, AiqusError> {
        let client = CompletionClient::new(settings.completions_url())?;
        Ok(Self {
            settings: Arc::new(settings),
            history,
            client,
        })
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Starts a request on the current tokio runtime and returns immediately.
    ///
    /// Returns `None` after reporting [`AiqusError::Config`] through
    /// `handler.on_error` when no API key is configured; no request is made in
    /// that case. Must be called from within a tokio runtime.
    pub fn stream_chat<H: ChatHandler>(
        &self,
        query: impl Into<String>,
        options: ChatOptions,
        mut handler: H,
        conversation_id: Option<String>,
    ) -> Option<ChatHandle> {
        let prepared = match self.prepare(query.into(), options, conversation_id) {
            Ok(prepared) => prepared,
            Err(err) => {
                handler.on_error(err);
                return None;
            }
        };

        let session = prepared.record.clone();
        let cancel = CancelHandle::new();
        let service = self.clone();
        let token = cancel.token().clone();
        let task = tokio::spawn(async move {
            service.execute(prepared, &mut handler, &token).await;
        });
        Some(ChatHandle::new(session, cancel, task))
    }

    /// Runs a request to completion on the current task.
    ///
    /// Same callback contract as [`stream_chat`](Self::stream_chat). Returns the
    /// record passed to `on_finish`, or `None` if `on_finish` did not fire.
    pub async fn chat<H: ChatHandler + ?Sized>(
        &self,
        query: impl Into<String>,
        options: ChatOptions,
        handler: &mut H,
        conversation_id: Option<String>,
        cancel: &CancelHandle,
    ) -> Option<SessionRecord> {
        match self.prepare(query.into(), options, conversation_id) {
            Ok(prepared) => self.execute(prepared, handler, cancel.token()).await,
            Err(err) => {
                handler.on_error(err);
                None
            }
        }
    }

    fn prepare(
        &self,
        query: String,
        mut options: ChatOptions,
        conversation_id: Option<String>,
    ) -> Result<Prepared, AiqusError> {
        let api_key = self
            .settings
            .api_key()
            .ok_or_else(|| AiqusError::Config("OpenAI API key is not configured".into()))?
            .to_string();

        let model = self.settings.resolve_model(options.model.as_deref());
        let files = std::mem::take(&mut options.files);
        let mut record = SessionRecord::new(
            query,
            SearchType::Chat,
            model,
            files,
            conversation_id.clone(),
        );
        record.message_id = generate_message_id();

        Ok(Prepared {
            record,
            api_key,
            options,
            conversation_id,
        })
    }

    async fn execute<H: ChatHandler + ?Sized>(
        &self,
        prepared: Prepared,
        handler: &mut H,
        token: &CancellationToken,
    ) -> Option<SessionRecord> {
        let Prepared {
            mut record,
            api_key,
            options,
            conversation_id,
        } = prepared;

        info!(
            message_id = %record.message_id,
            conversation_id = %record.conversation_id,
            model = %record.model,
            "starting chat stream"
        );

        let mut answer = AnswerAccumulator::new(record.message_id.clone());
        let outcome = self
            .pump(
                &record,
                &api_key,
                options,
                conversation_id.as_deref(),
                handler,
                &mut answer,
                token,
            )
            .await;

        match outcome {
            Ok(()) => {}
            Err(AiqusError::Cancelled) => {
                info!(
                    message_id = %record.message_id,
                    fragments = answer.fragment_count(),
                    "chat stream cancelled"
                );
                if answer.is_empty() {
                    return None;
                }
            }
            Err(err) => {
                warn!(message_id = %record.message_id, error = %err, "chat stream failed");
                handler.on_error(err);
                if answer.is_empty() {
                    return None;
                }
            }
        }

        record.answer = answer.into_answer();
        debug!(
            message_id = %record.message_id,
            answer_len = record.answer.len(),
            "chat stream finished"
        );
        handler.on_finish(record.clone());
        Some(record)
    }

    /// Everything between dispatch and the end of the body. Returns
    /// `Err(Cancelled)` as soon as the token fires at any suspension point.
    #[allow(clippy::too_many_arguments)]
    async fn pump<H: ChatHandler + ?Sized>(
        &self,
        record: &SessionRecord,
        api_key: &str,
        mut options: ChatOptions,
        conversation_id: Option<&str>,
        handler: &mut H,
        answer: &mut AnswerAccumulator,
        token: &CancellationToken,
    ) -> Result<(), AiqusError> {
        let messages = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(AiqusError::Cancelled),
            messages = assembler::assemble(
                self.history.as_ref(),
                &self.settings,
                &record.query,
                conversation_id,
                options.messages.take(),
            ) => messages,
        };

        let request =
            CompletionRequest::streaming(record.model.clone(), messages, &options, &self.settings);
        debug!(
            message_id = %record.message_id,
            messages = request.messages.len(),
            url = self.client.url(),
            "dispatching completion request"
        );

        let response = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(AiqusError::Cancelled),
            response = self.client.open_stream(api_key, &request) => response?,
        };

        let mut lines = LineStream::new(response.bytes_stream());
        let mut parser = DeltaParser::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(AiqusError::Cancelled),
                next = lines.next() => next,
            };
            match next {
                None => break,
                Some(Ok(line)) => {
                    if let Some(text) = parser.feed(&line) {
                        if token.is_cancelled() {
                            return Err(AiqusError::Cancelled);
                        }
                        answer.append(text, |fragment| handler.on_fragment(fragment));
                    }
                }
                Some(Err(e)) => {
                    return Err(AiqusError::transport(
                        format!("failed to read response body: {e}"),
                        e,
                    ));
                }
            }
        }

        debug!(
            message_id = %record.message_id,
            saw_done = parser.saw_done(),
            fragments = answer.fragment_count(),
            malformed = parser.malformed(),
            "response body complete"
        );
        Ok(())
    }
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("settings", &self.settings)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiqus_core::{Fragment, HistoryTurn};
    use async_trait::async_trait;

    struct NoHistory;

    #[async_trait]
    impl HistoryStore for NoHistory {
        async fn chat_history(&self) -> Result<Vec<HistoryTurn>, AiqusError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct Errors(Vec<AiqusError>);

    impl ChatHandler for Errors {
        fn on_fragment(&mut self, _fragment: Fragment) {}
        fn on_finish(&mut self, _session: SessionRecord) {}
        fn on_error(&mut self, error: AiqusError) {
            self.0.push(error);
        }
    }

    fn service(settings: ChatSettings) -> ChatService {
        ChatService::new(settings, Arc::new(NoHistory)).unwrap()
    }

    #[tokio::test]
    async fn missing_api_key_fails_fast() {
        let svc = service(ChatSettings::new("http://127.0.0.1:9"));
        let mut handler = Errors::default();
        let result = svc
            .chat("hi", ChatOptions::default(), &mut handler, None, &CancelHandle::new())
            .await;
        assert!(result.is_none());
        assert_eq!(handler.0.len(), 1);
        assert!(matches!(handler.0[0], AiqusError::Config(_)));
    }

    #[tokio::test]
    async fn blank_api_key_counts_as_missing() {
        let svc = service(ChatSettings::new("http://127.0.0.1:9").with_api_key("   "));
        assert!(
            svc.stream_chat("hi", ChatOptions::default(), Errors::default(), None)
                .is_none()
        );
    }

    #[test]
    fn prepare_fills_record() {
        let svc = service(ChatSettings::new("http://localhost").with_api_key("k"));
        let options = ChatOptions::new().with_model("gpt-4o");
        let prepared = svc
            .prepare("q".into(), options, Some("conv-1".into()))
            .unwrap();
        let record = prepared.record;
        assert_eq!(record.model, "gpt-4o");
        assert_eq!(record.conversation_id, "conv-1");
        assert_eq!(record.search_type, SearchType::Chat);
        assert!(record.message_id.starts_with("msg-"));
        assert!(record.answer.is_empty());
    }

    #[test]
    fn prepare_uses_fallback_model_without_catalog() {
        let svc = service(ChatSettings::new("http://localhost").with_api_key("k"));
        let record = svc
            .prepare("q".into(), ChatOptions::default(), None)
            .unwrap()
            .record;
        assert_eq!(record.model, aiqus_config::FALLBACK_MODEL);
        assert!(record.starts_conversation());
    }

    #[test]
    fn debug_output_hides_api_key() {
        let svc = service(ChatSettings::new("http://localhost").with_api_key("sk-secret"));
        assert!(!format!("{svc:?}").contains("sk-secret"));
    }
}
