// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness with a temp-dir SQLite store and a mock sender.

use std::sync::Arc;

use tempfile::TempDir;
use wacast_config::model::{StorageConfig, WacastConfig};
use wacast_core::{CampaignError, CampaignStore, SendOutcome};
use wacast_storage::SqliteStorage;

use crate::mock_sender::MockSender;

/// Storage, sender, and config wired together for one test.
///
/// The temp directory lives as long as the harness.
pub struct TestHarness {
    pub store: Arc<SqliteStorage>,
    pub sender: MockSender,
    pub config: WacastConfig,
    _temp_dir: TempDir,
}

impl TestHarness {
    /// Harness whose sender accepts every send.
    pub async fn new() -> Result<Self, CampaignError> {
        Self::with_outcomes(Vec::new()).await
    }

    /// Harness whose sender replays `outcomes` first.
    pub async fn with_outcomes(outcomes: Vec<SendOutcome>) -> Result<Self, CampaignError> {
        let temp_dir = TempDir::new().map_err(|e| CampaignError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let config = WacastConfig {
            storage: StorageConfig {
                database_path: db_path.to_string_lossy().to_string(),
                wal_mode: true,
            },
            ..WacastConfig::default()
        };

        let store = SqliteStorage::new(config.storage.clone());
        store.initialize().await?;

        Ok(Self {
            store: Arc::new(store),
            sender: MockSender::with_outcomes(outcomes),
            config,
            _temp_dir: temp_dir,
        })
    }

    /// The store as a trait object.
    pub fn campaign_store(&self) -> Arc<dyn CampaignStore> {
        self.store.clone()
    }

    /// The sender as a trait object. Shares queue and call log with
    /// the `sender` field.
    pub fn message_sender(&self) -> Arc<dyn wacast_core::MessageSender> {
        Arc::new(self.sender.clone())
    }
}
