// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook callback model plus subscription and signature checks.
//!
//! Every field is optional and unknown fields are ignored: the provider's
//! payloads vary by event type and API version.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sha2::Sha256;

/// Top-level callback body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub statuses: Vec<StatusUpdate>,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

/// A delivery-status callback for a message we sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub recipient_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub recipient: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
}

/// An inbound message from a recipient, treated as a reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sender: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wa_id: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl StatusUpdate {
    /// Provider message id this status refers to.
    pub fn message_id(&self) -> Option<&str> {
        present(&self.id).or_else(|| present(&self.message_id))
    }

    /// Recipient phone as reported by the provider.
    pub fn recipient(&self) -> Option<&str> {
        present(&self.recipient_id)
            .or_else(|| present(&self.to))
            .or_else(|| present(&self.recipient))
            .or_else(|| present(&self.phone_number))
    }

    pub fn status(&self) -> Option<&str> {
        present(&self.status)
    }

    /// Failure reason, if the provider gave one.
    pub fn reason(&self) -> Option<&str> {
        if let Some(message) = self.error.as_ref().and_then(|e| present(&e.message)) {
            return Some(message);
        }
        if let Some(first) = self.errors.first()
            && let Some(text) = present(&first.message).or_else(|| present(&first.title))
        {
            return Some(text);
        }
        present(&self.reason)
    }
}

impl InboundMessage {
    /// Phone number of the sender.
    pub fn sender(&self) -> Option<&str> {
        present(&self.from)
            .or_else(|| present(&self.sender))
            .or_else(|| present(&self.wa_id))
    }
}

impl WebhookPayload {
    pub fn statuses(&self) -> impl Iterator<Item = &StatusUpdate> {
        self.change_values().flat_map(|v| v.statuses.iter())
    }

    pub fn messages(&self) -> impl Iterator<Item = &InboundMessage> {
        self.change_values().flat_map(|v| v.messages.iter())
    }

    /// Every change value, in payload order.
    pub fn change_values(&self) -> impl Iterator<Item = &ChangeValue> {
        self.entry
            .iter()
            .flat_map(|e| e.changes.iter())
            .map(|c| &c.value)
    }
}

/// Accepts strings and numbers; anything else reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Answer a subscription handshake. Returns the challenge to echo back when
/// the mode is `subscribe` and the token matches the configured one.
pub fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    expected_token: Option<&str>,
) -> Option<String> {
    let expected = expected_token.filter(|t| !t.is_empty())?;
    if mode == Some("subscribe") && token == Some(expected) {
        Some(challenge.unwrap_or_default().to_string())
    } else {
        None
    }
}

/// Check an `X-Hub-Signature-256` header (`sha256=<hex>`) against the body.
pub fn verify_signature(app_secret: &str, header: Option<&str>, body: &[u8]) -> bool {
    let Some(hex_sig) = header.and_then(|h| h.trim().strip_prefix("sha256=")) else {
        return false;
    };
    let Ok(signature) = hex::decode(hex_sig) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Compute the header value the provider would send for `body`.
pub fn sign_body(app_secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> WebhookPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn status_fields_and_reason_priority() {
        let payload = parse(json!({
            "object": "whatsapp_business_account",
            "entry": [{"id": "1", "changes": [{"field": "messages", "value": {
                "statuses": [
                    {"id": "wamid.A", "recipient_id": "919876543210", "status": "failed",
                     "errors": [{"code": 131026, "title": "Message undeliverable"}]},
                    {"message_id": "wamid.B", "to": 447700900123u64, "status": "read",
                     "error": {"message": "primary"}, "reason": "secondary"},
                    {"status": "failed", "reason": "only reason"}
                ]
            }}]}]
        }));
        let statuses: Vec<_> = payload.statuses().collect();
        assert_eq!(statuses.len(), 3);

        assert_eq!(statuses[0].message_id(), Some("wamid.A"));
        assert_eq!(statuses[0].recipient(), Some("919876543210"));
        assert_eq!(statuses[0].reason(), Some("Message undeliverable"));

        assert_eq!(statuses[1].message_id(), Some("wamid.B"));
        assert_eq!(statuses[1].recipient(), Some("447700900123"));
        assert_eq!(statuses[1].status(), Some("read"));
        assert_eq!(statuses[1].reason(), Some("primary"));

        assert_eq!(statuses[2].message_id(), None);
        assert_eq!(statuses[2].reason(), Some("only reason"));
    }

    #[test]
    fn inbound_sender_fallbacks() {
        let payload = parse(json!({"entry": [{"changes": [{"value": {
            "messages": [{"from": "919876543210", "type": "text"}, {"wa_id": "447700900123"}, {}]
        }}]}]}));
        let senders: Vec<_> = payload.messages().map(InboundMessage::sender).collect();
        assert_eq!(
            senders,
            vec![Some("919876543210"), Some("447700900123"), None]
        );
    }

    #[test]
    fn empty_or_foreign_payloads_parse_to_nothing() {
        let payload = parse(json!({}));
        assert_eq!(payload.statuses().count(), 0);
        let payload = parse(json!({"entry": [{"changes": [{"field": "account_update"}]}]}));
        assert_eq!(payload.messages().count(), 0);
    }

    #[test]
    fn subscription_requires_mode_and_matching_token() {
        let expected = Some("verify-me");
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("verify-me"), Some("1158201444"), expected),
            Some("1158201444".to_string())
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("wrong"), Some("c"), expected),
            None
        );
        assert_eq!(
            verify_subscription(Some("unsubscribe"), Some("verify-me"), Some("c"), expected),
            None
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), Some(""), Some("c"), None),
            None
        );
    }

    #[test]
    fn signature_round_trip_and_tamper() {
        let body = br#"{"entry":[]}"#;
        let header = sign_body("app-secret", body);
        assert!(header.starts_with("sha256="));
        assert!(verify_signature("app-secret", Some(&header), body));
        assert!(!verify_signature("other-secret", Some(&header), body));
        assert!(!verify_signature("app-secret", Some(&header), br#"{"entry":[1]}"#));
        assert!(!verify_signature("app-secret", None, body));
        assert!(!verify_signature("app-secret", Some("sha256=zz"), body));
        assert!(!verify_signature("app-secret", Some("md5=abc"), body));
    }
}
