// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folds provider webhook callbacks into send records.
//!
//! Callbacks may arrive late, twice, or out of order. Records are matched
//! by provider message id, falling back to the last 8 digits of the phone
//! number, and only ever move forward through the status lattice. Nothing
//! here returns an error: the provider must always get its 200.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize as _, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use wacast_core::{CampaignStore, SendRecord};
use wacast_recipients::normalize_phone;
use wacast_whatsapp::WebhookPayload;
use wacast_whatsapp::webhook::{InboundMessage, StatusUpdate};

/// Digits of the phone number used for fallback matching.
const SUFFIX_LEN: usize = 8;

/// What one callback did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Records changed and persisted.
    pub updated: usize,
    /// Events with no matching record.
    pub unmatched: usize,
    /// Suffix matches that spanned more than one campaign.
    pub ambiguous: usize,
}

/// Records touched during one callback, so events for the same record
/// compose before a single save.
#[derive(Default)]
struct RecordCache {
    records: HashMap<i64, SendRecord>,
    dirty: Vec<i64>,
}

impl RecordCache {
    /// The cached copy wins over a freshly loaded one.
    fn adopt(&mut self, record: SendRecord) -> i64 {
        let id = record.id;
        self.records.entry(id).or_insert(record);
        id
    }

    fn by_message_id(&self, message_id: &str) -> Option<i64> {
        self.records
            .values()
            .find(|r| r.provider_message_id.as_deref() == Some(message_id))
            .map(|r| r.id)
    }

    fn get_mut(&mut self, id: i64) -> Option<&mut SendRecord> {
        self.records.get_mut(&id)
    }

    fn mark_dirty(&mut self, id: i64) {
        if !self.dirty.contains(&id) {
            self.dirty.push(id);
        }
    }

    fn dirty_records(&self) -> Vec<SendRecord> {
        self.dirty
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }
}

/// Applies webhook callbacks to stored send records.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn CampaignStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    /// Reconcile a raw callback body.
    pub async fn reconcile(&self, body: &[u8]) -> ReconcileSummary {
        if body.iter().all(u8::is_ascii_whitespace) {
            return ReconcileSummary::default();
        }
        match serde_json::from_slice::<WebhookPayload>(body) {
            Ok(payload) => self.reconcile_payload(&payload).await,
            Err(e) => {
                warn!(error = %e, "ignoring unparseable webhook payload");
                ReconcileSummary::default()
            }
        }
    }

    /// Reconcile an already-parsed JSON callback.
    pub async fn reconcile_value(&self, value: &Value) -> ReconcileSummary {
        match WebhookPayload::deserialize(value) {
            Ok(payload) => self.reconcile_payload(&payload).await,
            Err(e) => {
                warn!(error = %e, "ignoring unparseable webhook payload");
                ReconcileSummary::default()
            }
        }
    }

    async fn reconcile_payload(&self, payload: &WebhookPayload) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        let mut cache = RecordCache::default();

        for change in payload.change_values() {
            for status in &change.statuses {
                self.apply_status(status, &mut cache, &mut summary).await;
            }
            for message in &change.messages {
                self.apply_reply(message, &mut cache, &mut summary).await;
            }
        }

        let dirty = cache.dirty_records();
        if !dirty.is_empty() {
            match self.store.save_records(&dirty).await {
                Ok(()) => summary.updated = dirty.len(),
                Err(e) => error!(error = %e, records = dirty.len(), "failed to save reconciled records"),
            }
        }
        if summary != ReconcileSummary::default() {
            info!(
                updated = summary.updated,
                unmatched = summary.unmatched,
                ambiguous = summary.ambiguous,
                "webhook reconciled"
            );
        }
        summary
    }

    async fn apply_status(
        &self,
        status: &StatusUpdate,
        cache: &mut RecordCache,
        summary: &mut ReconcileSummary,
    ) {
        let Some(raw_status) = status.status() else {
            debug!("status callback without a status value");
            return;
        };

        let mut target = None;
        if let Some(message_id) = status.message_id() {
            target = self.find_by_message_id(message_id, cache).await;
        }
        if target.is_none()
            && let Some(recipient) = status.recipient()
        {
            target = self.find_by_suffix(recipient, cache, summary).await;
        }

        let Some(id) = target else {
            debug!(
                message_id = status.message_id().unwrap_or_default(),
                status = raw_status,
                "no record matches status callback"
            );
            summary.unmatched += 1;
            return;
        };

        let changed = cache
            .get_mut(id)
            .is_some_and(|record| record.apply_status_event(raw_status, status.reason()));
        if changed {
            debug!(record_id = id, status = raw_status, "record status advanced");
            cache.mark_dirty(id);
        }
    }

    async fn apply_reply(
        &self,
        message: &InboundMessage,
        cache: &mut RecordCache,
        summary: &mut ReconcileSummary,
    ) {
        let Some(sender) = message.sender() else {
            return;
        };
        let Some(id) = self.find_by_suffix(sender, cache, summary).await else {
            debug!("no record matches inbound reply");
            summary.unmatched += 1;
            return;
        };
        if cache.get_mut(id).is_some_and(SendRecord::mark_replied) {
            debug!(record_id = id, "record marked replied");
            cache.mark_dirty(id);
        }
    }

    async fn find_by_message_id(&self, message_id: &str, cache: &mut RecordCache) -> Option<i64> {
        if let Some(id) = cache.by_message_id(message_id) {
            return Some(id);
        }
        match self.store.find_record_by_message_id(message_id).await {
            Ok(record) => record.map(|r| cache.adopt(r)),
            Err(e) => {
                error!(error = %e, message_id, "message id lookup failed");
                None
            }
        }
    }

    async fn find_by_suffix(
        &self,
        phone: &str,
        cache: &mut RecordCache,
        summary: &mut ReconcileSummary,
    ) -> Option<i64> {
        let digits = normalize_phone(phone)?;
        let suffix = phone_suffix(&digits);
        match self.store.find_latest_by_phone_suffix(suffix).await {
            Ok(Some(hit)) => {
                if hit.distinct_campaigns > 1 {
                    warn!(
                        suffix,
                        campaigns = hit.distinct_campaigns,
                        record_id = hit.record.id,
                        "phone suffix matches several campaigns, using the newest record"
                    );
                    summary.ambiguous += 1;
                }
                Some(cache.adopt(hit.record))
            }
            Ok(None) => None,
            Err(e) => {
                error!(error = %e, suffix, "phone suffix lookup failed");
                None
            }
        }
    }
}

/// The last [`SUFFIX_LEN`] digits, or all of them for short numbers.
fn phone_suffix(digits: &str) -> &str {
    &digits[digits.len().saturating_sub(SUFFIX_LEN)..]
}
