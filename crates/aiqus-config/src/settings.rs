// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only settings view handed to the chat core.

use std::fmt;

use crate::model::{AiqusConfig, ModelOption};

/// Model used when neither the request nor the catalog names one.
pub const FALLBACK_MODEL: &str = "gpt-3.5-turbo";

/// Everything the chat core reads from configuration.
///
/// Built once from [`AiqusConfig`] and shared immutably by every request.
#[derive(Clone)]
pub struct ChatSettings {
    api_key: Option<String>,
    base_url: String,
    system_prompt: Option<String>,
    models: Vec<ModelOption>,
    temperature: f32,
    max_tokens: u32,
}

impl ChatSettings {
    /// Creates settings for `base_url` with no credential, no system prompt,
    /// an empty catalog, and the standard sampling defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            system_prompt: None,
            models: Vec::new(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_models(mut self, models: Vec<ModelOption>) -> Self {
        self.models = models;
        self
    }

    /// The bearer credential, if one is configured and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the streaming completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// The system prompt, if one is configured and non-empty.
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref().filter(|p| !p.is_empty())
    }

    pub fn models(&self) -> &[ModelOption] {
        &self.models
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// The catalog entry flagged as default, first one wins.
    pub fn default_model(&self) -> Option<&ModelOption> {
        self.models.iter().find(|m| m.default)
    }

    /// Picks the model for a request: explicit choice, catalog default, then
    /// [`FALLBACK_MODEL`].
    pub fn resolve_model(&self, requested: Option<&str>) -> String {
        requested
            .filter(|m| !m.is_empty())
            .or_else(|| self.default_model().map(|m| m.value.as_str()))
            .unwrap_or(FALLBACK_MODEL)
            .to_string()
    }
}

impl From<&AiqusConfig> for ChatSettings {
    fn from(config: &AiqusConfig) -> Self {
        Self {
            api_key: config.openai.api_key.clone(),
            base_url: config.openai.api_url.clone(),
            system_prompt: config.chat.system_prompt.clone(),
            models: config.chat.models.clone(),
            temperature: config.chat.temperature,
            max_tokens: config.chat.max_tokens,
        }
    }
}

impl fmt::Debug for ChatSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("system_prompt", &self.system_prompt)
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
