// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-call options and the completion request body.

use aiqus_config::ChatSettings;
use aiqus_core::{Attachment, Message};
use rand::Rng;
use serde::Serialize;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 8;

/// Caller overrides for a single chat request. Everything is optional.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Model identifier; falls back to the catalog default.
    pub model: Option<String>,
    /// Explicit message sequence. When non-empty, history assembly is skipped.
    pub messages: Option<Vec<Message>>,
    /// Attachment descriptors recorded on the session.
    pub files: Vec<Attachment>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn with_files(mut self, files: Vec<Attachment>) -> Self {
        self.files = files;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// JSON body of `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl CompletionRequest {
    /// Builds a streaming request, filling unset sampling options from settings.
    pub fn streaming(
        model: String,
        messages: Vec<Message>,
        options: &ChatOptions,
        settings: &ChatSettings,
    ) -> Self {
        Self {
            model,
            messages,
            stream: true,
            temperature: options.temperature.unwrap_or(settings.temperature()),
            max_tokens: options.max_tokens.unwrap_or(settings.max_tokens()),
            top_p: options.top_p,
        }
    }
}

/// Returns a fresh message id of the form `msg-{millis}-{8 base36 chars}`.
pub fn generate_message_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("msg-{}-{suffix}", chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_uses_settings_defaults() {
        let settings = ChatSettings::new("http://localhost");
        let request = CompletionRequest::streaming(
            "gpt-3.5-turbo".into(),
            vec![Message::system("S"), Message::user("hi")],
            &ChatOptions::default(),
            &settings,
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "S"},
                    {"role": "user", "content": "hi"}
                ],
                "stream": true,
                "temperature": 0.7f32,
                "max_tokens": 2000
            })
        );
    }

    #[test]
    fn options_override_sampling_and_add_top_p() {
        let settings = ChatSettings::new("http://localhost");
        let options = ChatOptions::new()
            .with_temperature(0.2)
            .with_max_tokens(64)
            .with_top_p(0.9);
        let body =
            serde_json::to_value(CompletionRequest::streaming("m".into(), vec![], &options, &settings))
                .unwrap();
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["temperature"], json!(0.2f32));
        assert_eq!(body["top_p"], json!(0.9f32));
    }

    #[test]
    fn message_id_has_expected_shape() {
        let id = generate_message_id();
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "msg");
        assert!(parts[1].parse::<i64>().is_ok(), "timestamp part: {}", parts[1]);
        assert_eq!(parts[2].len(), ID_SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn message_ids_differ() {
        assert_ne!(generate_message_id(), generate_message_id());
    }
}
