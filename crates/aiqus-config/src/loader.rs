// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered figment sources for [`AiqusConfig`].
//!
//! Precedence, highest first: `AIQUS_*` variables, `./aiqus.toml`, the
//! per-user file, `/etc/aiqus/aiqus.toml`, compiled defaults.

#![allow(clippy::result_large_err)] // figment::Error is large and not ours to box

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::AiqusConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/aiqus/aiqus.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "aiqus.toml";

/// Per-user config file under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("aiqus/aiqus.toml"))
}

/// Extracts the configuration from every source in the search path.
pub fn load_config() -> Result<AiqusConfig, figment::Error> {
    build_figment().extract()
}

/// Defaults overlaid with `toml_content` alone.
pub fn load_config_from_str(toml_content: &str) -> Result<AiqusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AiqusConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Defaults, then `path`, then the environment. The search path is skipped.
pub fn load_config_from_path(path: &Path) -> Result<AiqusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AiqusConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full search path, unextracted.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AiqusConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Maps `AIQUS_SECTION_KEY` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `AIQUS_OPENAI_API_KEY` maps to `openai.api_key`, not `openai.api.key`.
fn env_provider() -> Env {
    Env::prefixed("AIQUS_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in ["app", "openai", "chat", "storage"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
