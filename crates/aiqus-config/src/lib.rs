// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the aiqus chat client.
//!
//! `aiqus.toml` files are layered with `AIQUS_*` environment overrides,
//! unknown keys are rejected with a suggested spelling, and the result is
//! checked before use. [`ChatSettings`] is the read-only view the chat core
//! is built from.
//!
//! # Usage
//!
//! ```no_run
//! use aiqus_config::{load_and_validate, ChatSettings};
//!
//! let Ok(config) = load_and_validate() else {
//!     return;
//! };
//! let settings = ChatSettings::from(&config);
//! println!("endpoint: {}", settings.completions_url());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod settings;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{AiqusConfig, ModelOption};
pub use settings::{ChatSettings, FALLBACK_MODEL};

/// Loads the layered configuration and checks it. Parse failures and rule
/// violations both come back as diagnostics ready for [`render_errors`].
pub fn load_and_validate() -> Result<AiqusConfig, Vec<ConfigError>> {
    finish(loader::load_config())
}

/// Like [`load_and_validate`], reading one explicit file instead of the search path.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<AiqusConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path))
}

/// Parses and checks TOML text without consulting files or the environment.
pub fn load_and_validate_str(toml_content: &str) -> Result<AiqusConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content))
}

#[allow(clippy::result_large_err)]
fn finish(loaded: Result<AiqusConfig, figment::Error>) -> Result<AiqusConfig, Vec<ConfigError>> {
    match loaded {
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
        Ok(config) => validation::validate_config(&config)
            .map(|()| config)
            .inspect_err(|errors| {
                tracing::debug!(count = errors.len(), "configuration failed validation");
            }),
    }
}
