// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign CRUD operations.

use rusqlite::params;
use wacast_core::CampaignError;

use crate::database::Database;
use crate::models::{Campaign, CampaignOverview, NewCampaign};

const CAMPAIGN_COLUMNS: &str =
    "id, title, recipients_csv, message_title, message_body, media_link, created_at";

fn campaign_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Campaign> {
    Ok(Campaign {
        id: row.get(0)?,
        title: row.get(1)?,
        recipients_csv: row.get(2)?,
        message_title: row.get(3)?,
        message_body: row.get(4)?,
        media_link: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a campaign and return the stored row.
pub async fn create_campaign(db: &Database, new: &NewCampaign) -> Result<Campaign, CampaignError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO campaigns (title, recipients_csv, message_title, message_body, media_link)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    new.title,
                    new.recipients_csv,
                    new.message_title,
                    new.message_body,
                    new.media_link,
                ],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1"),
                params![id],
                campaign_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a campaign by ID.
pub async fn get_campaign(db: &Database, id: i64) -> Result<Option<Campaign>, CampaignError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1"),
                params![id],
                campaign_from_row,
            );
            match result {
                Ok(campaign) => Ok(Some(campaign)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List campaigns newest first, each with its send-record count.
pub async fn list_campaigns(db: &Database) -> Result<Vec<CampaignOverview>, CampaignError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.title, c.recipients_csv, c.message_title, c.message_body,
                        c.media_link, c.created_at, COUNT(r.id)
                 FROM campaigns c
                 LEFT JOIN send_records r ON r.campaign_id = c.id
                 GROUP BY c.id
                 ORDER BY c.id DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(CampaignOverview {
                    campaign: campaign_from_row(row)?,
                    record_count: row.get(7)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a campaign. Its send records go with it (`ON DELETE CASCADE`).
pub async fn delete_campaign(db: &Database, id: i64) -> Result<bool, CampaignError> {
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute("DELETE FROM campaigns WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
