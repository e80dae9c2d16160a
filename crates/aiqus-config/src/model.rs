// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `aiqus.toml` schema. Every table rejects keys it does not know.

use serde::{Deserialize, Serialize};

/// Root of `aiqus.toml`. Missing tables fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AiqusConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// OpenAI-compatible endpoint settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Chat request defaults and the model catalog.
    #[serde(default)]
    pub chat: ChatConfig,

    /// History persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[app]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the application.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Filter level for the `aiqus` log targets.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "aiqus".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI-compatible endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// Bearer credential. `None` makes every chat request fail fast.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL; requests go to `{api_url}/chat/completions`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// One selectable model in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelOption {
    /// Human-readable label.
    pub label: String,

    /// Model identifier sent to the endpoint.
    pub value: String,

    /// Marks the model used when a request names none.
    #[serde(default)]
    pub default: bool,
}

impl ModelOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            default: false,
        }
    }

    /// Marks this option as the catalog default.
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

/// Chat request defaults and model catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// System prompt prepended to every assembled conversation.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Sampling temperature used when a request does not override it.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output length cap used when a request does not override it.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Ordered catalog of selectable models.
    #[serde(default = "default_models")]
    pub models: Vec<ModelOption>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            models: default_models(),
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_models() -> Vec<ModelOption> {
    vec![
        ModelOption::new("GPT-3.5", "gpt-3.5-turbo").as_default(),
        ModelOption::new("GPT-4o", "gpt-4o"),
        ModelOption::new("GPT-4 Turbo", "gpt-4-turbo-preview"),
        ModelOption::new("Claude 3 Opus", "claude-3-opus-20240229"),
        ModelOption::new("Claude 3 Sonnet", "claude-3-sonnet-20240229"),
        ModelOption::new("Claude 3 Haiku", "claude-3-haiku-20240307"),
    ]
}

/// History persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path of the JSON history document.
    #[serde(default = "default_history_path")]
    pub history_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
        }
    }
}

fn default_history_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("aiqus").join("history.json"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "history.json".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_single_default() {
        let chat = ChatConfig::default();
        let defaults: Vec<_> = chat.models.iter().filter(|m| m.default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].value, "gpt-3.5-turbo");
    }

    #[test]
    fn models_array_deserializes_correctly() {
        let toml_str = r#"
[chat]
system_prompt = "Be brief"

[[chat.models]]
label = "Mini"
value = "gpt-4o-mini"
default = true

[[chat.models]]
label = "Full"
value = "gpt-4o"
"#;
        let config: AiqusConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chat.system_prompt.as_deref(), Some("Be brief"));
        assert_eq!(config.chat.models.len(), 2);
        assert!(config.chat.models[0].default);
        assert!(!config.chat.models[1].default);
        assert_eq!(config.chat.temperature, 0.7);
        assert_eq!(config.chat.max_tokens, 2000);
    }

    #[test]
    fn models_deny_unknown_fields() {
        let toml_str = r#"
[[chat.models]]
label = "Mini"
value = "gpt-4o-mini"
context = 128000
"#;
        assert!(toml::from_str::<AiqusConfig>(toml_str).is_err());
    }
}
