// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the CampaignStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use wacast_config::model::StorageConfig;
use wacast_core::{
    AdapterType, Campaign, CampaignError, CampaignOverview, CampaignStore, HealthStatus,
    NewCampaign, PluginAdapter, SendRecord, SuffixMatch,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed campaign store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened on the first call to [`CampaignStore::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage. Nothing is opened until `initialize`.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, CampaignError> {
        self.db.get().ok_or_else(|| CampaignError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(db: &Database) -> Result<(), CampaignError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CampaignError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CampaignError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl CampaignStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), CampaignError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| CampaignError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CampaignError> {
        Self::checkpoint(self.db()?).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Campaigns ---

    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<Campaign, CampaignError> {
        queries::campaigns::create_campaign(self.db()?, campaign).await
    }

    async fn get_campaign(&self, id: i64) -> Result<Option<Campaign>, CampaignError> {
        queries::campaigns::get_campaign(self.db()?, id).await
    }

    async fn list_campaigns(&self) -> Result<Vec<CampaignOverview>, CampaignError> {
        queries::campaigns::list_campaigns(self.db()?).await
    }

    async fn delete_campaign(&self, id: i64) -> Result<bool, CampaignError> {
        queries::campaigns::delete_campaign(self.db()?, id).await
    }

    // --- Send records ---

    async fn create_record(
        &self,
        campaign_id: i64,
        phone_number: &str,
    ) -> Result<SendRecord, CampaignError> {
        queries::records::create_record(self.db()?, campaign_id, phone_number).await
    }

    async fn records_for_campaign(
        &self,
        campaign_id: i64,
    ) -> Result<Vec<SendRecord>, CampaignError> {
        queries::records::records_for_campaign(self.db()?, campaign_id).await
    }

    async fn find_record_by_message_id(
        &self,
        message_id: &str,
    ) -> Result<Option<SendRecord>, CampaignError> {
        queries::records::find_by_message_id(self.db()?, message_id).await
    }

    async fn find_latest_by_phone_suffix(
        &self,
        suffix: &str,
    ) -> Result<Option<SuffixMatch>, CampaignError> {
        queries::records::find_latest_by_phone_suffix(self.db()?, suffix).await
    }

    async fn save_records(&self, records: &[SendRecord]) -> Result<(), CampaignError> {
        queries::records::save_records(self.db()?, records).await
    }
}
