// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for wacast.
//!
//! Provides the error type, campaign domain types, and the adapter traits
//! that the storage and provider crates implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CampaignError;
pub use types::{
    AdapterType, Campaign, CampaignOverview, HealthStatus, NewCampaign, SendOutcome, SendRecord,
    SendStatus, SuffixMatch, TemplateSend,
};

pub use traits::{CampaignStore, MessageSender, PluginAdapter};
