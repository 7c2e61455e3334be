// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the wacast configuration system.

use wacast_config::diagnostic::ConfigError;
use wacast_config::model::WacastConfig;
use wacast_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[agent]
log_level = "debug"

[storage]
database_path = "/tmp/wacast-test.db"
wal_mode = false

[gateway]
bind_address = "0.0.0.0"
port = 8080
max_upload_bytes = 2048

[whatsapp]
access_token = "EAAG123"
phone_number_id = "926600003859644"
template_name = "spring_sale"
language_code = "en_GB"
timeout_secs = 15
webhook_verify_token = "verify-me"

[auth]
username = "operator"
password = "1234"
session_ttl_secs = 600
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/wacast-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.max_upload_bytes, 2048);
    assert_eq!(config.whatsapp.access_token.as_deref(), Some("EAAG123"));
    assert_eq!(config.whatsapp.phone_number_id, "926600003859644");
    assert_eq!(config.whatsapp.template_name, "spring_sale");
    assert_eq!(config.whatsapp.language_code, "en_GB");
    assert_eq!(config.whatsapp.timeout_secs, 15);
    assert_eq!(
        config.whatsapp.webhook_verify_token.as_deref(),
        Some("verify-me")
    );
    // Unset keys keep their defaults.
    assert_eq!(config.whatsapp.api_version, "v22.0");
    assert_eq!(config.auth.username, "operator");
    assert_eq!(config.auth.password.as_deref(), Some("1234"));
    assert_eq!(config.auth.session_ttl_secs, 600);
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML is valid");
    assert_eq!(config.gateway.bind_address, "127.0.0.1");
    assert_eq!(config.gateway.port, 3000);
    assert_eq!(config.whatsapp.template_name, "orangetour_christmas");
    assert!(config.whatsapp.access_token.is_none());
    assert!(config.auth.password.is_none());
    assert!(config.storage.database_path.ends_with("wacast.db"));
}

/// Section-first env mapping keeps underscores inside field names.
#[test]
fn dotted_override_reaches_underscored_field() {
    use figment::{Figment, providers::Serialized};

    let config: WacastConfig = Figment::new()
        .merge(Serialized::defaults(WacastConfig::default()))
        .merge(("whatsapp.access_token", "from-env"))
        .extract()
        .expect("should merge override");
    assert_eq!(config.whatsapp.access_token.as_deref(), Some("from-env"));
}

#[test]
#[serial_test::serial]
fn env_var_overrides_file_value() {
    let dir = std::env::temp_dir().join(format!("wacast-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("wacast.toml");
    std::fs::write(&path, "[whatsapp]\ntemplate_name = \"from_file\"\n").unwrap();

    // SAFETY: serialized with other env-mutating tests.
    unsafe { std::env::set_var("WACAST_WHATSAPP_TEMPLATE_NAME", "from_env") };
    let config = load_config_from_path(&path);
    unsafe { std::env::remove_var("WACAST_WHATSAPP_TEMPLATE_NAME") };

    let config = config.expect("should load");
    assert_eq!(config.whatsapp.template_name, "from_env");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn deny_unknown_fields_at_top_level() {
    let err = load_config_from_str("[telegram]\nbot_token = \"x\"\n")
        .expect_err("unknown section should be rejected");
    assert!(format!("{err}").contains("telegram"));
}

#[test]
fn unknown_key_produces_suggestion() {
    let toml = r#"
[whatsapp]
acess_token = "abc"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "acess_token"
                && suggestion.as_deref() == Some("access_token")
                && valid_keys.contains("phone_number_id")
        })
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported_with_path() {
    let toml = r#"
[gateway]
port = "eighty"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_errors_surface_through_load_and_validate() {
    let toml = r#"
[whatsapp]
timeout_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero timeout is invalid");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("timeout_secs"))
    ));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let errors = load_and_validate_str("[auth]\nusrname = \"x\"\n").unwrap_err();
    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    let diagnostic: &dyn Diagnostic = &errors[0];
    handler.render_report(&mut buf, diagnostic).unwrap();
    assert!(buf.contains("usrname"));
}
