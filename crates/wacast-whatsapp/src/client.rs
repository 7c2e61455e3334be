// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WhatsApp Cloud API messages endpoint.
//!
//! [`WhatsAppClient::send_template`] never returns an error: every failure
//! mode is folded into a [`SendOutcome::Rejected`] carrying the text an
//! operator should see.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};
use wacast_config::model::WhatsAppConfig;
use wacast_core::{CampaignError, SendOutcome, TemplateSend};

use crate::types::TemplateRequest;

/// HTTP client for template sends.
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    access_token: Option<String>,
    base_url: String,
    api_version: String,
    phone_number_id: String,
    template_name: String,
    language_code: String,
}

impl WhatsAppClient {
    /// Creates a client from the `[whatsapp]` config section.
    ///
    /// A missing access token is not an error here; each send reports it.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, CampaignError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CampaignError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            access_token: config
                .access_token
                .clone()
                .filter(|t| !t.trim().is_empty()),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            phone_number_id: config.phone_number_id.clone(),
            template_name: config.template_name.clone(),
            language_code: config.language_code.clone(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// True when an access token is configured.
    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.base_url, self.api_version, self.phone_number_id
        )
    }

    /// Send the configured template to one recipient.
    pub async fn send_template(&self, send: &TemplateSend) -> SendOutcome {
        let Some(token) = &self.access_token else {
            return SendOutcome::Rejected {
                error: "Missing WhatsApp access token".into(),
            };
        };

        let request = TemplateRequest::new(
            &send.to,
            &self.template_name,
            &self.language_code,
            send.media_link.as_deref(),
        );

        let response = match self
            .client
            .post(self.endpoint())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(to = %send.to, error = %e, "template send failed in transport");
                return SendOutcome::Rejected {
                    error: format!("Network error: {e}"),
                };
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return SendOutcome::Rejected {
                    error: format!("Network error: {e}"),
                };
            }
        };
        debug!(to = %send.to, status, "template send response received");

        let outcome = classify_response(status, &body);
        if let SendOutcome::Rejected { error } = &outcome {
            warn!(to = %send.to, status, error = %error, "template send rejected");
        }
        outcome
    }
}

/// Classify a messages-endpoint response into a send outcome.
pub fn classify_response(status: u16, body: &str) -> SendOutcome {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return SendOutcome::Rejected {
            error: format!("HTTP {status} - non-json response"),
        };
    };

    let error = json.get("error").filter(|e| !e.is_null());
    let first_error = json
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first());

    if status >= 400 || error.is_some() || first_error.is_some() {
        let message = match error.or(first_error) {
            Some(err) => err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string()),
            None => format!("HTTP {status} - Unknown API error"),
        };
        return SendOutcome::Rejected { error: message };
    }

    let message_id = json
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.first())
        .and_then(|first| first.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty());

    match message_id {
        Some(id) => SendOutcome::Accepted {
            message_id: id.to_string(),
            raw: json.to_string(),
        },
        None => SendOutcome::Rejected {
            error: "Provider response did not include a message id".into(),
        },
    }
}
