// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wacast report <id>`: print a stored campaign's delivery report.

use wacast_config::model::WacastConfig;
use wacast_core::{CampaignError, CampaignStore};
use wacast_engine::{ReportSummary, render_document};
use wacast_storage::SqliteStorage;

/// Render the report document for campaign `id`.
pub async fn campaign_report(store: &dyn CampaignStore, id: i64) -> Result<String, CampaignError> {
    let campaign = store
        .get_campaign(id)
        .await?
        .ok_or_else(|| CampaignError::campaign_not_found(id))?;
    let records = store.records_for_campaign(id).await?;
    Ok(render_document(
        &campaign,
        &ReportSummary::from_records(&records),
    ))
}

/// Runs the `wacast report` command.
pub async fn run_report(config: &WacastConfig, id: i64) -> Result<(), CampaignError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let document = campaign_report(&storage, id).await;
    storage.close().await?;
    print!("{}", document?);
    Ok(())
}
