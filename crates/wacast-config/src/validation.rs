// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use crate::diagnostic::ConfigError;
use crate::model::WacastConfig;

/// Upper bound for the provider send timeout.
const MAX_TIMEOUT_SECS: u64 = 300;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors rather than failing fast.
pub fn validate_config(config: &WacastConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.gateway.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.bind_address must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "gateway.bind_address `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    if config.gateway.port == 0 {
        errors.push(ConfigError::Validation {
            message: "gateway.port must be non-zero".to_string(),
        });
    }

    if config.gateway.max_upload_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "gateway.max_upload_bytes must be greater than zero".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let timeout = config.whatsapp.timeout_secs;
    if timeout == 0 || timeout > MAX_TIMEOUT_SECS {
        errors.push(ConfigError::Validation {
            message: format!(
                "whatsapp.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {timeout}"
            ),
        });
    }

    if config.whatsapp.api_version.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "whatsapp.api_version must not be empty".to_string(),
        });
    }

    if config.whatsapp.template_name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "whatsapp.template_name must not be empty".to_string(),
        });
    }

    if config.auth.session_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "auth.session_ttl_secs must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
