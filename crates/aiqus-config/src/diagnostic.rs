// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment failures into miette diagnostics.
//!
//! Misspelled keys get a "did you mean" hint drawn from the keys the
//! section actually accepts.

#![allow(unused_assignments)] // emitted by the miette Diagnostic derive

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler};
use thiserror::Error;

/// Jaro-Winkler score a candidate key must beat to be offered as a fix.
const CLOSE_ENOUGH: f64 = 0.75;

/// A problem found while loading `aiqus.toml` or the `AIQUS_*` environment.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a recognised setting{}", where_in(.section))]
    #[diagnostic(
        code(aiqus::config::unknown_key),
        help("{}", unknown_key_hint(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Dotted table path, empty for top-level keys.
        section: String,
        suggestion: Option<String>,
        valid_keys: String,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(aiqus::config::invalid_type), help("use a value of type {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("`{key}` is required but was not set")]
    #[diagnostic(
        code(aiqus::config::missing_key),
        help("set `{key}` in aiqus.toml or through an AIQUS_ environment variable")
    )]
    MissingKey { key: String },

    /// A value parsed fine but breaks a rule checked after loading.
    #[error("invalid setting: {message}")]
    #[diagnostic(code(aiqus::config::validation))]
    Validation { message: String },

    #[error("could not load configuration: {0}")]
    #[diagnostic(code(aiqus::config::other))]
    Other(String),
}

impl From<&figment::Error> for ConfigError {
    fn from(error: &figment::Error) -> Self {
        let section = error.path.join(".");
        match &error.kind {
            Kind::UnknownField(field, accepted) => ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, accepted),
                valid_keys: accepted.join(", "),
                section,
            },
            Kind::MissingField(field) if section.is_empty() => ConfigError::MissingKey {
                key: field.to_string(),
            },
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: format!("{section}.{field}"),
            },
            Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                detail: format!("got {found} where {expected} was expected"),
                expected: expected.to_string(),
                key: section,
            },
            _ => ConfigError::Other(error.to_string()),
        }
    }
}

fn where_in(section: &str) -> String {
    match section {
        "" => String::new(),
        table => format!(" in [{table}]"),
    }
}

fn unknown_key_hint(suggestion: Option<&str>, valid_keys: &str) -> String {
    let accepted = format!("accepted keys here: {valid_keys}");
    match suggestion {
        Some(close) => format!("perhaps `{close}`? {accepted}"),
        None => accepted,
    }
}

/// Splits an accumulated figment error into one diagnostic per failure.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter().map(|e| ConfigError::from(&e)).collect()
}

/// Closest accepted key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for &candidate in valid_keys {
        let score = strsim::jaro_winkler(unknown, candidate);
        if score > CLOSE_ENOUGH && best.is_none_or(|(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best.map(|(key, _)| key.to_owned())
}

/// Writes every diagnostic to stderr, falling back to plain text when the
/// graphical renderer fails.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("config error: {error}"),
        }
    }
}
