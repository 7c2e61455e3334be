// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./wacast.toml` > `~/.config/wacast/wacast.toml` > `/etc/wacast/wacast.toml`
//! with environment variable overrides via the `WACAST_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::WacastConfig;

/// Top-level sections that env var names are split on.
const SECTIONS: &[&str] = &["agent", "storage", "gateway", "whatsapp", "auth"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/wacast/wacast.toml`
/// 3. `~/.config/wacast/wacast.toml`
/// 4. `./wacast.toml`
/// 5. `WACAST_*` environment variables
pub fn load_config() -> Result<WacastConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<WacastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WacastConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WacastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WacastConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WacastConfig::default()))
        .merge(Toml::file("/etc/wacast/wacast.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("wacast/wacast.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("wacast.toml"))
        .merge(env_provider())
}

/// Map a lowercased, prefix-stripped env var name onto a dotted config key.
///
/// Only the leading section name is split off, so
/// `whatsapp_access_token` becomes `whatsapp.access_token`.
pub fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// Map a prefix-stripped env var name as figment hands it over (original
/// case, e.g. `WHATSAPP_ACCESS_TOKEN`) onto a dotted config key.
fn map_env_key(key: &str) -> String {
    env_key_to_path(&key.to_ascii_lowercase())
}

/// Environment variable provider. Uses `Env::map()` rather than `split("_")`
/// because field names contain underscores.
fn env_provider() -> Env {
    Env::prefixed("WACAST_").map(|key| map_env_key(key.as_str()).into())
}
