// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign store trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::CampaignError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Campaign, CampaignOverview, NewCampaign, SendRecord, SuffixMatch};

/// Durable record store for campaigns and their send records.
#[async_trait]
pub trait CampaignStore: PluginAdapter {
    /// Initializes the backend (migrations, connection setup).
    async fn initialize(&self) -> Result<(), CampaignError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), CampaignError>;

    // --- Campaigns ---

    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<Campaign, CampaignError>;

    async fn get_campaign(&self, id: i64) -> Result<Option<Campaign>, CampaignError>;

    /// All campaigns, newest first.
    async fn list_campaigns(&self) -> Result<Vec<CampaignOverview>, CampaignError>;

    /// Deletes a campaign and, by cascade, its records. Returns false if absent.
    async fn delete_campaign(&self, id: i64) -> Result<bool, CampaignError>;

    // --- Send records ---

    /// Inserts a `pending` record for one recipient and returns it.
    async fn create_record(
        &self,
        campaign_id: i64,
        phone_number: &str,
    ) -> Result<SendRecord, CampaignError>;

    async fn records_for_campaign(&self, campaign_id: i64)
    -> Result<Vec<SendRecord>, CampaignError>;

    async fn find_record_by_message_id(
        &self,
        message_id: &str,
    ) -> Result<Option<SendRecord>, CampaignError>;

    /// Newest non-failed record whose number ends with `suffix`.
    async fn find_latest_by_phone_suffix(
        &self,
        suffix: &str,
    ) -> Result<Option<SuffixMatch>, CampaignError>;

    /// Persists the mutable fields of every record in one transaction.
    async fn save_records(&self, records: &[SendRecord]) -> Result<(), CampaignError>;
}
