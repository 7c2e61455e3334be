// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API adapter for wacast.
//!
//! Implements [`MessageSender`] for approved template messages and provides
//! the webhook callback model used by status reconciliation.

pub mod client;
pub mod types;
pub mod webhook;

use async_trait::async_trait;
use tracing::info;
use wacast_config::model::WhatsAppConfig;
use wacast_core::{
    AdapterType, CampaignError, HealthStatus, MessageSender, PluginAdapter, SendOutcome,
    TemplateSend,
};

use crate::client::WhatsAppClient;

pub use webhook::{WebhookPayload, sign_body, verify_signature, verify_subscription};

/// Template sender backed by the Cloud API.
pub struct WhatsAppSender {
    client: WhatsAppClient,
}

impl WhatsAppSender {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, CampaignError> {
        let client = WhatsAppClient::new(config)?;
        info!(
            template = %config.template_name,
            language = %config.language_code,
            token_configured = client.has_token(),
            "WhatsApp sender initialized"
        );
        Ok(Self { client })
    }

    /// Creates a sender with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: WhatsAppClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for WhatsAppSender {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sender
    }

    async fn health_check(&self) -> Result<HealthStatus, CampaignError> {
        if self.client.has_token() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(
                "no access token configured; every send will be rejected".into(),
            ))
        }
    }

    async fn shutdown(&self) -> Result<(), CampaignError> {
        Ok(())
    }
}

#[async_trait]
impl MessageSender for WhatsAppSender {
    async fn send_template(&self, send: &TemplateSend) -> SendOutcome {
        self.client.send_template(send).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sender_identity_and_health() {
        let sender = WhatsAppSender::new(&WhatsAppConfig::default()).unwrap();
        assert_eq!(sender.name(), "whatsapp");
        assert_eq!(sender.adapter_type(), AdapterType::Sender);
        assert!(matches!(
            sender.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));

        let configured = WhatsAppSender::new(&WhatsAppConfig {
            access_token: Some("EAAG".into()),
            ..WhatsAppConfig::default()
        })
        .unwrap();
        assert_eq!(
            configured.health_check().await.unwrap(),
            HealthStatus::Healthy
        );
    }

    #[tokio::test]
    async fn trait_send_delegates_to_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"messages": [{"id": "wamid.T"}]})),
            )
            .mount(&server)
            .await;

        let config = WhatsAppConfig {
            access_token: Some("EAAG".into()),
            phone_number_id: "1".into(),
            ..WhatsAppConfig::default()
        };
        let client = WhatsAppClient::new(&config)
            .unwrap()
            .with_base_url(server.uri());
        let sender: Box<dyn MessageSender> = Box::new(WhatsAppSender::with_client(client));

        let outcome = sender
            .send_template(&TemplateSend {
                to: "919876543210".into(),
                media_link: None,
            })
            .await;
        assert!(outcome.is_accepted());
    }
}
