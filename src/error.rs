// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Library error type

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by the shelf, its store and the remote source
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid user input, rejected before any I/O
    #[error("{0}")]
    Validation(String),

    /// The remote account does not exist
    #[error("GitHub user not found: {0}")]
    UserNotFound(String),

    /// The API rate limit is exhausted
    #[error("GitHub API rate limit exhausted{}", reset_suffix(.reset))]
    RateLimited {
        /// When the limit window resets, if reported
        reset: Option<DateTime<Utc>>,
    },

    /// Non-success response from the API
    #[error("GitHub API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response message
        message: String,
    },

    /// Transport failure talking to the API
    #[error("failed to reach GitHub: {0}")]
    Network(#[from] reqwest::Error),

    /// A store entry could not be written or removed
    #[error("failed to persist {entry}: {source}")]
    Persistence {
        /// Store entry name
        entry: &'static str,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A store entry could not be serialized
    #[error("failed to serialize {entry}: {source}")]
    Serialize {
        /// Store entry name
        entry: &'static str,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// A snapshot could not be parsed; nothing was imported
    #[error("invalid snapshot: {0}")]
    Import(#[source] serde_json::Error),

    /// Settings could not be loaded
    #[error("invalid settings: {0}")]
    Config(#[from] config::ConfigError),
}

fn reset_suffix(reset: &Option<DateTime<Utc>>) -> String {
    reset.map(|r| format!(" (resets at {r})")).unwrap_or_default()
}

impl Error {
    /// Whether retrying the same request may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited { .. })
    }
}

/// Library result alias
pub type Result<T> = std::result::Result<T, Error>;
