// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level wacast configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WacastConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// WhatsApp Cloud API settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Operator login settings.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("wacast").join("wacast.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("wacast.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the HTTP server to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to bind the HTTP server to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body, including uploads.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// WhatsApp Cloud API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Permanent or system-user access token. `None` makes every send fail.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Business phone number ID that messages are sent from.
    #[serde(default)]
    pub phone_number_id: String,

    /// Graph API host.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Graph API version path segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Approved template name.
    #[serde(default = "default_template_name")]
    pub template_name: String,

    /// Template language code as approved in Business Manager.
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Per-send HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Token echoed back during the webhook subscription handshake.
    #[serde(default)]
    pub webhook_verify_token: Option<String>,

    /// Meta app secret. When set, webhook payloads must carry a valid
    /// `X-Hub-Signature-256` header.
    #[serde(default)]
    pub app_secret: Option<String>,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: String::new(),
            api_base_url: default_api_base_url(),
            api_version: default_api_version(),
            template_name: default_template_name(),
            language_code: default_language_code(),
            timeout_secs: default_timeout_secs(),
            webhook_verify_token: None,
            app_secret: None,
        }
    }
}

impl fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "[redacted]"))
            .field("phone_number_id", &self.phone_number_id)
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("template_name", &self.template_name)
            .field("language_code", &self.language_code)
            .field("timeout_secs", &self.timeout_secs)
            .field(
                "webhook_verify_token",
                &self.webhook_verify_token.as_ref().map(|_| "[redacted]"),
            )
            .field("app_secret", &self.app_secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

fn default_api_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_api_version() -> String {
    "v22.0".to_string()
}

fn default_template_name() -> String {
    "orangetour_christmas".to_string()
}

fn default_language_code() -> String {
    "en_US".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

/// Operator login configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Operator username (compared case-insensitively).
    #[serde(default = "default_username")]
    pub username: String,

    /// Operator password. `None` rejects every login.
    #[serde(default)]
    pub password: Option<String>,

    /// Key for signing session tokens. `None` derives one from the password.
    #[serde(default)]
    pub session_secret: Option<String>,

    /// Session token lifetime.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: None,
            session_secret: None,
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field(
                "session_secret",
                &self.session_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish()
    }
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_session_ttl_secs() -> u64 {
    12 * 60 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let config = WacastConfig {
            whatsapp: WhatsAppConfig {
                access_token: Some("EAAG-secret".into()),
                app_secret: Some("app-secret".into()),
                ..Default::default()
            },
            auth: AuthConfig {
                password: Some("hunter2".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("EAAG-secret"));
        assert!(!debug.contains("app-secret"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn defaults_match_provider_contract() {
        let wa = WhatsAppConfig::default();
        assert_eq!(wa.api_version, "v22.0");
        assert_eq!(wa.language_code, "en_US");
        assert_eq!(wa.timeout_secs, 20);
    }
}
