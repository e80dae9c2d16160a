// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring a wiremock completion endpoint to a `ChatService`.

use std::sync::Arc;

use aiqus_chat::{CancelHandle, ChatOptions, ChatService};
use aiqus_config::{ChatSettings, ModelOption};
use aiqus_core::{AiqusError, HistoryTurn, SessionRecord};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::mock_history::MockHistory;
use crate::recording::RecordingHandler;

/// API key the harness configures by default.
pub const TEST_API_KEY: &str = "sk-test";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    system_prompt: Option<String>,
    history: Option<MockHistory>,
    api_key: Option<String>,
    models: Vec<ModelOption>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            system_prompt: None,
            history: None,
            api_key: Some(TEST_API_KEY.to_string()),
            models: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_history(mut self, turns: Vec<HistoryTurn>) -> Self {
        self.history = Some(MockHistory::with_turns(turns));
        self
    }

    /// Use a history store that fails every lookup.
    pub fn with_failing_history(mut self) -> Self {
        self.history = Some(MockHistory::failing());
        self
    }

    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    pub fn with_models(mut self, models: Vec<ModelOption>) -> Self {
        self.models = models;
        self
    }

    /// Start the mock server and build the service against it.
    pub async fn build(self) -> Result<TestHarness, AiqusError> {
        let server = MockServer::start().await;
        let history = Arc::new(self.history.unwrap_or_default());

        let mut settings = ChatSettings::new(server.uri()).with_models(self.models);
        if let Some(key) = self.api_key {
            settings = settings.with_api_key(key);
        }
        if let Some(prompt) = self.system_prompt {
            settings = settings.with_system_prompt(prompt);
        }

        let service = ChatService::new(settings.clone(), history.clone())?;
        Ok(TestHarness {
            server,
            history,
            settings,
            service,
        })
    }
}

/// A wiremock server, a mock history, and a service pointed at both.
pub struct TestHarness {
    pub server: MockServer,
    pub history: Arc<MockHistory>,
    pub settings: ChatSettings,
    pub service: ChatService,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Serve `body` as a `text/event-stream` answer to every completion request.
    pub async fn mount_stream(&self, body: impl Into<String>) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body.into()),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer every completion request with `status` and `body`.
    pub async fn mount_status(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Runs one request to completion and returns what the handler saw.
    pub async fn ask(
        &self,
        query: &str,
        options: ChatOptions,
        conversation_id: Option<&str>,
    ) -> (RecordingHandler, Option<SessionRecord>) {
        let mut recorder = RecordingHandler::new();
        let record = self
            .service
            .chat(
                query,
                options,
                &mut recorder,
                conversation_id.map(str::to_string),
                &CancelHandle::new(),
            )
            .await;
        (recorder, record)
    }

    /// JSON bodies of every request the mock server received.
    pub async fn request_bodies(&self) -> Vec<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }

    /// A service with the same settings and history, pointed at `base_url`.
    pub fn service_for(&self, base_url: &str) -> Result<ChatService, AiqusError> {
        let mut settings = ChatSettings::new(base_url).with_models(self.settings.models().to_vec());
        if let Some(key) = self.settings.api_key() {
            settings = settings.with_api_key(key);
        }
        if let Some(prompt) = self.settings.system_prompt() {
            settings = settings.with_system_prompt(prompt);
        }
        ChatService::new(settings, self.history.clone())
    }
}
