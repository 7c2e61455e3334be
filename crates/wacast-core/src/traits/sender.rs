// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound template sender trait.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::{SendOutcome, TemplateSend};

/// Sends one approved template message to one recipient.
#[async_trait]
pub trait MessageSender: PluginAdapter {
    /// Sends the template and classifies the provider's answer.
    ///
    /// Never fails: transport and provider errors come back as
    /// [`SendOutcome::Rejected`] so the caller can keep going.
    async fn send_template(&self, send: &TemplateSend) -> SendOutcome;
}
