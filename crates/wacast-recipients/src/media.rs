// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Header-image link rewriting.

use std::sync::LazyLock;

use regex::Regex;

/// Google Drive share links carry the file id either as a path segment or
/// as a query parameter.
static DRIVE_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"/d/([A-Za-z0-9_-]+)").unwrap(),
        Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").unwrap(),
    ]
});

/// Turn an operator-supplied media link into one the provider can fetch.
///
/// Drive share links become direct-view links; other links pass through.
/// Blank input means no media.
pub fn rewrite_media_link(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    if link.contains("drive.google.com") {
        for pattern in DRIVE_ID_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(link) {
                return Some(format!(
                    "https://drive.google.com/uc?export=view&id={}",
                    &caps[1]
                ));
            }
        }
    }
    Some(link.to_string())
}
