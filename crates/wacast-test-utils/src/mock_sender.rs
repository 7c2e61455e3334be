// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock template sender for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use wacast_core::{
    AdapterType, CampaignError, HealthStatus, MessageSender, PluginAdapter, SendOutcome,
    TemplateSend,
};

/// A sender that replays pre-configured outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, the send
/// is accepted with a generated `wamid.mock-N` id.
#[derive(Clone, Default)]
pub struct MockSender {
    outcomes: Arc<Mutex<VecDeque<SendOutcome>>>,
    calls: Arc<Mutex<Vec<TemplateSend>>>,
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender pre-loaded with the given outcomes.
    pub fn with_outcomes(outcomes: Vec<SendOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            calls: Arc::default(),
        }
    }

    /// Queue one more outcome.
    pub async fn push_outcome(&self, outcome: SendOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Every send made so far, in call order.
    pub async fn calls(&self) -> Vec<TemplateSend> {
        self.calls.lock().await.clone()
    }

    /// Shorthand for an accepted outcome.
    pub fn accepted(message_id: &str) -> SendOutcome {
        SendOutcome::Accepted {
            message_id: message_id.to_string(),
            raw: format!(r#"{{"messages":[{{"id":"{message_id}"}}]}}"#),
        }
    }

    /// Shorthand for a rejected outcome.
    pub fn rejected(error: &str) -> SendOutcome {
        SendOutcome::Rejected {
            error: error.to_string(),
        }
    }
}

#[async_trait]
impl PluginAdapter for MockSender {
    fn name(&self) -> &str {
        "mock-sender"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sender
    }

    async fn health_check(&self) -> Result<HealthStatus, CampaignError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CampaignError> {
        Ok(())
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send_template(&self, send: &TemplateSend) -> SendOutcome {
        let call_index = {
            let mut calls = self.calls.lock().await;
            calls.push(send.clone());
            calls.len()
        };
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Self::accepted(&format!("wamid.mock-{call_index}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(to: &str) -> TemplateSend {
        TemplateSend {
            to: to.into(),
            media_link: None,
        }
    }

    #[tokio::test]
    async fn queued_outcomes_then_default() {
        let sender = MockSender::with_outcomes(vec![MockSender::rejected("boom")]);
        assert_eq!(
            sender.send_template(&send("1")).await,
            MockSender::rejected("boom")
        );
        assert_eq!(
            sender.send_template(&send("2")).await,
            MockSender::accepted("wamid.mock-2")
        );
        let calls = sender.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].to, "2");
    }

    #[tokio::test]
    async fn clones_share_state() {
        let sender = MockSender::new();
        let handle = sender.clone();
        handle.push_outcome(MockSender::rejected("later")).await;
        assert!(!sender.send_template(&send("1")).await.is_accepted());
        assert_eq!(handle.calls().await.len(), 1);
    }
}
