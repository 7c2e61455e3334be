// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits: campaigns, send records,
//! and the delivery-status lattice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Sender,
}

/// Delivery state of one send record.
///
/// Stored and serialized as lowercase text. Provider statuses that wacast
/// does not model are kept verbatim in [`SendStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SendStatus {
    Pending,
    Sent,
    Delivered,
    #[strum(serialize = "seen", serialize = "read")]
    Seen,
    Replied,
    Failed,
    #[strum(default)]
    Other(String),
}

impl SendStatus {
    /// Position in the progress lattice. Status never moves to a lower rank.
    ///
    /// `Failed` and unmodelled statuses share the rank of `Sent` so that a
    /// later delivery report can still lift them.
    pub fn rank(&self) -> u8 {
        match self {
            SendStatus::Pending => 0,
            SendStatus::Sent | SendStatus::Failed | SendStatus::Other(_) => 1,
            SendStatus::Delivered => 2,
            SendStatus::Seen => 3,
            SendStatus::Replied => 4,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SendStatus::Failed)
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SendStatus::Pending => "pending",
            SendStatus::Sent => "sent",
            SendStatus::Delivered => "delivered",
            SendStatus::Seen => "seen",
            SendStatus::Replied => "replied",
            SendStatus::Failed => "failed",
            SendStatus::Other(raw) => raw,
        };
        f.write_str(s)
    }
}

impl Serialize for SendStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SendStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SendStatus::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// A stored campaign: one batch submission of a template to many recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub title: String,
    /// Accepted final numbers, comma-joined, so a refill starts from validated data.
    pub recipients_csv: String,
    pub message_title: String,
    pub message_body: String,
    pub media_link: Option<String>,
    pub created_at: String,
}

/// Fields needed to insert a campaign row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub title: String,
    pub recipients_csv: String,
    pub message_title: String,
    pub message_body: String,
    pub media_link: Option<String>,
}

/// A campaign with its record count, as listed in the history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignOverview {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub record_count: i64,
}

/// One recipient's outcome within a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRecord {
    pub id: i64,
    pub campaign_id: i64,
    pub phone_number: String,
    pub status: SendStatus,
    pub delivered: bool,
    pub seen: bool,
    pub replied: bool,
    pub error_message: Option<String>,
    pub created_at: String,
    pub provider_message_id: Option<String>,
}

impl SendRecord {
    /// Record the result of the dispatch call for this recipient.
    pub fn apply_outcome(&mut self, outcome: &SendOutcome) {
        match outcome {
            SendOutcome::Accepted { message_id, raw } => {
                self.status = SendStatus::Sent;
                self.provider_message_id = Some(message_id.clone());
                self.error_message = Some(raw.clone());
            }
            SendOutcome::Rejected { error } => {
                self.status = SendStatus::Failed;
                self.error_message = Some(error.clone());
            }
        }
    }

    /// Apply one provider status callback. Returns whether anything changed.
    ///
    /// `read`/`seen` always implies delivery. Progress events only move up
    /// the [`SendStatus::rank`] lattice, so late or duplicated ones are
    /// no-ops. `failed` sits outside the lattice and always applies.
    pub fn apply_status_event(&mut self, raw_status: &str, reason: Option<&str>) -> bool {
        let raw_status = raw_status.trim();
        if raw_status.is_empty() {
            return false;
        }
        let before = self.clone();
        let event = SendStatus::from_str(raw_status)
            .unwrap_or_else(|_| SendStatus::Other(raw_status.to_string()));

        match event {
            SendStatus::Delivered => {
                self.delivered = true;
                self.raise(SendStatus::Delivered);
            }
            SendStatus::Seen => {
                self.delivered = true;
                self.seen = true;
                self.raise(SendStatus::Seen);
            }
            SendStatus::Failed => {
                self.status = SendStatus::Failed;
                if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
                    self.error_message = Some(reason.to_string());
                }
            }
            SendStatus::Sent | SendStatus::Other(_) => {
                let progressable = matches!(
                    self.status,
                    SendStatus::Pending | SendStatus::Sent | SendStatus::Other(_)
                );
                if progressable {
                    self.status = event;
                }
            }
            // Not provider statuses.
            SendStatus::Pending | SendStatus::Replied => {}
        }

        *self != before
    }

    /// Mark an inbound reply. Already-replied records are left untouched.
    pub fn mark_replied(&mut self) -> bool {
        if self.replied {
            return false;
        }
        self.replied = true;
        self.status = SendStatus::Replied;
        true
    }

    fn raise(&mut self, target: SendStatus) {
        if target.rank() > self.status.rank() {
            self.status = target;
        }
    }
}

/// A record found by phone-suffix fallback, with the number of distinct
/// campaigns that share the suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixMatch {
    pub record: SendRecord,
    pub distinct_campaigns: i64,
}

/// One template send to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSend {
    /// Canonical dialable number.
    pub to: String,
    /// Direct-viewable header image link.
    pub media_link: Option<String>,
}

/// Result of a single provider send. Failures are values, not errors,
/// because one recipient's failure must never abort the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Accepted { message_id: String, raw: String },
    Rejected { error: String },
}

impl SendOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SendOutcome::Accepted { .. })
    }
}
