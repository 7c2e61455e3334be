// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery statistics and the downloadable campaign report.

use std::fmt::Write as _;

use chrono::DateTime;
use serde::Serialize;
use wacast_core::{Campaign, SendRecord};

/// Per-campaign delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub attempted: usize,
    pub delivered: usize,
    /// Not delivered yet and not failed.
    pub not_delivered: usize,
    pub seen: usize,
    /// Not seen yet and not failed.
    pub not_seen: usize,
    pub replied: usize,
    pub failed: usize,
}

impl ReportSummary {
    pub fn from_records(records: &[SendRecord]) -> Self {
        let count = |pred: fn(&SendRecord) -> bool| records.iter().filter(|r| pred(r)).count();
        Self {
            attempted: records.len(),
            delivered: count(|r| r.delivered),
            not_delivered: count(|r| !r.delivered && !r.status.is_failed()),
            seen: count(|r| r.seen),
            not_seen: count(|r| !r.seen && !r.status.is_failed()),
            replied: count(|r| r.replied),
            failed: count(|r| r.status.is_failed()),
        }
    }

    /// `count` as a share of attempted sends, one decimal place.
    pub fn percent(&self, count: usize) -> String {
        let denom = self.attempted.max(1) as f64;
        format!("{:.1}", count as f64 / denom * 100.0)
    }
}

/// Render `created_at` as `YYYY-MM-DD HH:MM`, or verbatim if unparseable.
fn sent_at(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

/// Plain-text campaign report.
pub fn render_document(campaign: &Campaign, summary: &ReportSummary) -> String {
    if summary.attempted == 0 {
        return "No messages sent.\n".to_string();
    }

    let mut doc = String::new();
    let heading = "WhatsApp Campaign Report";
    // Writing to a String cannot fail.
    let _ = writeln!(doc, "{heading}\n{}\n", "=".repeat(heading.len()));

    let _ = writeln!(doc, "Campaign Details");
    let _ = writeln!(doc, "  {:<24}{}", "Title:", campaign.title);
    let _ = writeln!(doc, "  {:<24}{}", "Message:", campaign.message_title);
    let _ = writeln!(doc, "  {:<24}{}", "Sent At:", sent_at(&campaign.created_at));
    let _ = writeln!(doc, "  {:<24}{}\n", "Recipients (attempted):", summary.attempted);

    let _ = writeln!(doc, "Delivery Statistics");
    let _ = writeln!(doc, "  {:<18}{:>8}{:>9}", "Metric", "Count", "%");
    for (label, count) in [
        ("Sent (attempted)", summary.attempted),
        ("Delivered", summary.delivered),
        ("Seen", summary.seen),
        ("Replied", summary.replied),
        ("Failed", summary.failed),
    ] {
        let _ = writeln!(
            doc,
            "  {label:<18}{count:>8}{:>9}",
            format!("{}%", summary.percent(count))
        );
    }

    let _ = writeln!(doc, "\nMessage Body\n{}", campaign.message_body);
    doc
}

/// Download name for a campaign report: the title's ASCII letters, digits,
/// and spaces, trimmed, plus `_report.txt`.
pub fn report_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    format!("{}_report.txt", cleaned.trim())
}
