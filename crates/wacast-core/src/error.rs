// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every wacast crate.

use thiserror::Error;

/// The primary error type used across adapter traits and campaign operations.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// Configuration errors (invalid TOML, missing credentials, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging provider errors that are not tied to a single recipient.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operator input was rejected before anything was written.
    #[error("{0}")]
    Validation(String),

    /// A campaign or record lookup by identifier found nothing.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Missing or invalid session credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CampaignError {
    /// Shorthand for a campaign lookup miss.
    pub fn campaign_not_found(id: i64) -> Self {
        CampaignError::NotFound {
            entity: "campaign",
            id: id.to_string(),
        }
    }
}
