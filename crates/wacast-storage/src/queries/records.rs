// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send record operations: creation, lookup for reconciliation, and
//! batched outcome persistence.

use std::str::FromStr;

use rusqlite::params;
use wacast_core::{CampaignError, SuffixMatch};

use crate::database::Database;
use crate::models::{SendRecord, SendStatus};

const RECORD_COLUMNS: &str = "id, campaign_id, phone_number, status, delivered, seen, replied,
     error_message, created_at, provider_message_id";

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SendRecord> {
    let status: String = row.get(3)?;
    Ok(SendRecord {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        phone_number: row.get(2)?,
        status: SendStatus::from_str(&status).unwrap_or(SendStatus::Other(status)),
        delivered: row.get(4)?,
        seen: row.get(5)?,
        replied: row.get(6)?,
        error_message: row.get(7)?,
        created_at: row.get(8)?,
        provider_message_id: row.get(9)?,
    })
}

/// Insert a `pending` record for one recipient.
pub async fn create_record(
    db: &Database,
    campaign_id: i64,
    phone_number: &str,
) -> Result<SendRecord, CampaignError> {
    let phone_number = phone_number.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO send_records (campaign_id, phone_number, status) VALUES (?1, ?2, ?3)",
                params![campaign_id, phone_number, SendStatus::Pending.to_string()],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM send_records WHERE id = ?1"),
                params![id],
                record_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All records of a campaign in dispatch order.
pub async fn records_for_campaign(
    db: &Database,
    campaign_id: i64,
) -> Result<Vec<SendRecord>, CampaignError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM send_records WHERE campaign_id = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![campaign_id], record_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find the record the provider assigned `message_id` to.
pub async fn find_by_message_id(
    db: &Database,
    message_id: &str,
) -> Result<Option<SendRecord>, CampaignError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM send_records
                     WHERE provider_message_id = ?1 ORDER BY id DESC LIMIT 1"
                ),
                params![message_id],
                record_from_row,
            );
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Newest non-failed record whose number ends with `suffix`, plus how many
/// distinct campaigns hold a matching record.
pub async fn find_latest_by_phone_suffix(
    db: &Database,
    suffix: &str,
) -> Result<Option<SuffixMatch>, CampaignError> {
    let suffix = suffix.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM send_records
                     WHERE substr(phone_number, -length(?1)) = ?1 AND status != 'failed'
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                params![suffix],
                record_from_row,
            );
            let record = match result {
                Ok(record) => record,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e),
            };
            let distinct_campaigns: i64 = conn.query_row(
                "SELECT COUNT(DISTINCT campaign_id) FROM send_records
                 WHERE substr(phone_number, -length(?1)) = ?1 AND status != 'failed'",
                params![suffix],
                |row| row.get(0),
            )?;
            Ok(Some(SuffixMatch {
                record,
                distinct_campaigns,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist status, flags, error text, and provider id of every record in
/// a single transaction.
pub async fn save_records(db: &Database, records: &[SendRecord]) -> Result<(), CampaignError> {
    if records.is_empty() {
        return Ok(());
    }
    let records = records.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "UPDATE send_records
                     SET status = ?1, delivered = ?2, seen = ?3, replied = ?4,
                         error_message = ?5, provider_message_id = ?6
                     WHERE id = ?7",
                )?;
                for rec in &records {
                    stmt.execute(params![
                        rec.status.to_string(),
                        rec.delivered,
                        rec.seen,
                        rec.replied,
                        rec.error_message,
                        rec.provider_message_id,
                        rec.id,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
