// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rules checked once the TOML has been deserialized: endpoint scheme,
//! at most one default model, numeric ranges.

use crate::diagnostic::ConfigError;
use crate::model::AiqusConfig;

/// Checks every rule and reports all violations together.
pub fn validate_config(config: &AiqusConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let api_url = config.openai.api_url.trim();
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("openai.api_url `{api_url}` must start with http:// or https://"),
        });
    }

    let defaults: Vec<&str> = config
        .chat
        .models
        .iter()
        .filter(|m| m.default)
        .map(|m| m.value.as_str())
        .collect();
    if defaults.len() > 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "at most one chat.models entry may set `default = true`, found {}: {}",
                defaults.len(),
                defaults.join(", ")
            ),
        });
    }

    for (i, model) in config.chat.models.iter().enumerate() {
        if model.value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("chat.models[{i}].value must not be empty"),
            });
        }
    }

    if !(0.0..=2.0).contains(&config.chat.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.temperature must be between 0.0 and 2.0, got {}",
                config.chat.temperature
            ),
        });
    }

    if config.chat.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.max_tokens must be at least 1".to_string(),
        });
    }

    if config.storage.history_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.history_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelOption;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = AiqusConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn two_default_models_fail_validation() {
        let mut config = AiqusConfig::default();
        config.chat.models = vec![
            ModelOption::new("A", "a").as_default(),
            ModelOption::new("B", "b").as_default(),
        ];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "at most one"));
    }

    #[test]
    fn non_http_api_url_fails_validation() {
        let mut config = AiqusConfig::default();
        config.openai.api_url = "ftp://example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "openai.api_url"));
    }

    #[test]
    fn out_of_range_temperature_fails_validation() {
        let mut config = AiqusConfig::default();
        config.chat.temperature = 3.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "chat.temperature"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = AiqusConfig::default();
        config.chat.max_tokens = 0;
        config.storage.history_path = " ".to_string();
        config.chat.models = vec![ModelOption::new("Empty", "")];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn empty_catalog_is_allowed() {
        let mut config = AiqusConfig::default();
        config.chat.models.clear();
        assert!(validate_config(&config).is_ok());
    }
}
