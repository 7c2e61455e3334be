// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign dispatch: validation, country-code resolution, persistence, and
//! the sequential send loop.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};
use wacast_core::{
    CampaignError, CampaignStore, MessageSender, NewCampaign, SendOutcome, TemplateSend,
};
use wacast_recipients::{CollectedRecipients, accept_length, country_code_digits, resolve_country_code};

/// One operator submission, after recipient collection.
#[derive(Debug, Clone, Default)]
pub struct CampaignRequest {
    pub title: String,
    pub message_title: String,
    pub message_body: String,
    /// Already rewritten to a direct-viewable link.
    pub media_link: Option<String>,
    /// Raw default country code as typed, e.g. `"+91"`.
    pub default_country_code: Option<String>,
    pub recipients: CollectedRecipients,
}

/// Final dialable numbers plus every input that was dropped on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchPlan {
    pub numbers: Vec<String>,
    pub skipped: Vec<String>,
}

/// Validate a request and resolve every candidate to a dialable number.
///
/// Pure: nothing is written, nothing is sent.
pub fn plan_recipients(request: &CampaignRequest) -> Result<DispatchPlan, CampaignError> {
    let candidates = &request.recipients.candidates;
    if candidates.is_empty() {
        return Err(CampaignError::Validation(
            "No valid phone numbers provided".into(),
        ));
    }
    if request.title.trim().is_empty() {
        return Err(CampaignError::Validation("Campaign title required".into()));
    }

    let default_cc = request
        .default_country_code
        .as_deref()
        .and_then(country_code_digits);
    if default_cc.is_none() && candidates.iter().any(|c| c.hint.is_none()) {
        return Err(CampaignError::Validation(
            "Some rows do not include country code. Please provide default_country_code (e.g. 91 for India).".into(),
        ));
    }

    let mut plan = DispatchPlan {
        numbers: Vec::with_capacity(candidates.len()),
        skipped: request.recipients.skipped.clone(),
    };
    for candidate in candidates {
        let cc = candidate
            .hint
            .as_deref()
            .or(default_cc.as_deref())
            .unwrap_or_default();
        let number = resolve_country_code(&candidate.phone, cc);
        if accept_length(&number) {
            plan.numbers.push(number);
        } else {
            plan.skipped.push(candidate.phone.clone());
        }
    }

    if plan.numbers.is_empty() {
        return Err(CampaignError::Validation(
            "No valid phone numbers after applying country codes".into(),
        ));
    }
    Ok(plan)
}

/// The result of sending to one number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchLine {
    pub number: String,
    pub outcome: SendOutcome,
}

impl fmt::Display for DispatchLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            SendOutcome::Accepted { .. } => write!(f, "{}: ✅ Sent", self.number),
            SendOutcome::Rejected { error } => write!(f, "{}: ❌ {error}", self.number),
        }
    }
}

/// Everything the operator sees after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub campaign_id: i64,
    pub lines: Vec<DispatchLine>,
    pub skipped: Vec<String>,
}

impl DispatchReport {
    pub fn accepted(&self) -> usize {
        self.lines.iter().filter(|l| l.outcome.is_accepted()).count()
    }

    /// Rendered per-number lines.
    pub fn messages(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }
}

/// Runs campaigns against a store and a sender.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn CampaignStore>,
    sender: Arc<dyn MessageSender>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn CampaignStore>, sender: Arc<dyn MessageSender>) -> Self {
        Self { store, sender }
    }

    /// Validate, persist, and send.
    ///
    /// Validation failures return before anything is written. Each number
    /// gets a pending record before its send, and all outcomes are saved in
    /// one transaction at the end. A rejected send is an outcome, not an
    /// error; storage failures propagate, after the outcomes gathered so far
    /// are saved.
    pub async fn dispatch(&self, request: &CampaignRequest) -> Result<DispatchReport, CampaignError> {
        let plan = plan_recipients(request)?;

        let campaign = self
            .store
            .create_campaign(&NewCampaign {
                title: request.title.trim().to_string(),
                recipients_csv: plan.numbers.join(","),
                message_title: request.message_title.clone(),
                message_body: request.message_body.clone(),
                media_link: request.media_link.clone(),
            })
            .await?;
        info!(
            campaign_id = campaign.id,
            recipients = plan.numbers.len(),
            skipped = plan.skipped.len(),
            "campaign created, dispatching"
        );

        let mut records = Vec::with_capacity(plan.numbers.len());
        let mut lines = Vec::with_capacity(plan.numbers.len());
        for number in &plan.numbers {
            let mut record = match self.store.create_record(campaign.id, number).await {
                Ok(record) => record,
                Err(e) => {
                    // Numbers already sent keep their outcome.
                    if let Err(save_err) = self.store.save_records(&records).await {
                        error!(
                            campaign_id = campaign.id,
                            error = %save_err,
                            "failed to save outcomes after storage error"
                        );
                    }
                    return Err(e);
                }
            };
            let outcome = self
                .sender
                .send_template(&TemplateSend {
                    to: number.clone(),
                    media_link: request.media_link.clone(),
                })
                .await;
            debug!(campaign_id = campaign.id, %number, accepted = outcome.is_accepted(), "send complete");

            record.apply_outcome(&outcome);
            records.push(record);
            lines.push(DispatchLine {
                number: number.clone(),
                outcome,
            });
        }

        self.store.save_records(&records).await?;

        let report = DispatchReport {
            campaign_id: campaign.id,
            lines,
            skipped: plan.skipped,
        };
        info!(
            campaign_id = campaign.id,
            accepted = report.accepted(),
            rejected = report.lines.len() - report.accepted(),
            "campaign dispatched"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wacast_core::{PluginAdapter, SendStatus};
    use wacast_recipients::{Candidate, RecipientCollector};
    use wacast_test_utils::{MockSender, TestHarness};

    fn candidate(phone: &str, hint: Option<&str>) -> Candidate {
        Candidate {
            phone: phone.into(),
            hint: hint.map(str::to_string),
        }
    }

    fn request(candidates: Vec<Candidate>, default_cc: Option<&str>) -> CampaignRequest {
        CampaignRequest {
            title: "Diwali".into(),
            message_title: "Festive offer".into(),
            message_body: "Flat 20% off".into(),
            media_link: None,
            default_country_code: default_cc.map(str::to_string),
            recipients: CollectedRecipients {
                candidates,
                skipped: Vec::new(),
            },
        }
    }

    fn validation_message(err: CampaignError) -> String {
        match err {
            CampaignError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_candidates_rejected_first() {
        let mut req = request(Vec::new(), None);
        req.title = String::new();
        assert_eq!(
            validation_message(plan_recipients(&req).unwrap_err()),
            "No valid phone numbers provided"
        );
    }

    #[test]
    fn blank_title_rejected() {
        let mut req = request(vec![candidate("919876543210", None)], Some("91"));
        req.title = "   ".into();
        assert_eq!(
            validation_message(plan_recipients(&req).unwrap_err()),
            "Campaign title required"
        );
    }

    #[test]
    fn hintless_rows_need_a_default_code() {
        let req = request(
            vec![candidate("9876543210", Some("91")), candidate("7700900123", None)],
            Some("+ "),
        );
        assert!(
            validation_message(plan_recipients(&req).unwrap_err())
                .starts_with("Some rows do not include country code")
        );
    }

    #[test]
    fn fully_hinted_rows_need_no_default() {
        let req = request(vec![candidate("9876543210", Some("91"))], None);
        let plan = plan_recipients(&req).unwrap();
        assert_eq!(plan.numbers, vec!["919876543210"]);
    }

    #[test]
    fn hint_wins_over_default_and_gate_skips() {
        let mut req = request(
            vec![
                candidate("7700900123", Some("44")),
                candidate("9876543210", None),
                candidate("12", None),
                candidate("1234567890123456", None),
            ],
            Some("91"),
        );
        req.recipients.skipped = vec!["n/a".into()];
        let plan = plan_recipients(&req).unwrap();
        assert_eq!(plan.numbers, vec!["447700900123", "919876543210"]);
        assert_eq!(plan.skipped, vec!["n/a", "12", "1234567890123456"]);
    }

    #[test]
    fn nothing_survives_resolution() {
        let req = request(vec![candidate("12", None)], Some("1"));
        assert_eq!(
            validation_message(plan_recipients(&req).unwrap_err()),
            "No valid phone numbers after applying country codes"
        );
    }

    #[test]
    fn lines_render_for_operator() {
        let ok = DispatchLine {
            number: "919876543210".into(),
            outcome: MockSender::accepted("wamid.1"),
        };
        let bad = DispatchLine {
            number: "447700900123".into(),
            outcome: MockSender::rejected("Network error: timed out"),
        };
        assert_eq!(ok.to_string(), "919876543210: ✅ Sent");
        assert_eq!(bad.to_string(), "447700900123: ❌ Network error: timed out");
    }

    #[tokio::test]
    async fn dispatch_persists_every_outcome() {
        let harness = TestHarness::with_outcomes(vec![
            MockSender::accepted("wamid.A"),
            MockSender::rejected("(#131030) Recipient not in allowed list"),
        ])
        .await
        .unwrap();
        let dispatcher = Dispatcher::new(harness.campaign_store(), harness.message_sender());

        let recipients = RecipientCollector::new()
            .with_text("9876543210\n98765 00000\nhello")
            .collect()
            .unwrap();
        let mut req = request(Vec::new(), Some("91"));
        req.recipients = recipients;
        req.media_link = Some("https://cdn.example.com/a.jpg".into());

        let report = dispatcher.dispatch(&req).await.unwrap();
        assert_eq!(report.accepted(), 1);
        assert_eq!(
            report.messages(),
            vec![
                "919876543210: ✅ Sent".to_string(),
                "919876500000: ❌ (#131030) Recipient not in allowed list".to_string(),
            ]
        );
        assert_eq!(report.skipped, vec!["hello"]);

        let calls = harness.sender.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0].media_link.as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );

        let campaign = harness
            .store
            .get_campaign(report.campaign_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(campaign.recipients_csv, "919876543210,919876500000");

        let records = harness
            .store
            .records_for_campaign(report.campaign_id)
            .await
            .unwrap();
        assert_eq!(records[0].status, SendStatus::Sent);
        assert_eq!(records[0].provider_message_id.as_deref(), Some("wamid.A"));
        assert!(records[0].error_message.as_deref().unwrap().contains("wamid.A"));
        assert_eq!(records[1].status, SendStatus::Failed);
        assert!(records[1].provider_message_id.is_none());
        assert_eq!(
            records[1].error_message.as_deref(),
            Some("(#131030) Recipient not in allowed list")
        );
    }

    #[tokio::test]
    async fn validation_failure_writes_nothing() {
        let harness = TestHarness::new().await.unwrap();
        let dispatcher = Dispatcher::new(harness.campaign_store(), harness.message_sender());

        let req = request(vec![candidate("123", None)], Some("1"));
        assert!(dispatcher.dispatch(&req).await.is_err());
        assert!(harness.store.list_campaigns().await.unwrap().is_empty());
        assert!(harness.sender.calls().await.is_empty());
    }

    /// Delegates to a real store but refuses the `fail_at`-th record insert.
    struct FailingInsertStore {
        inner: Arc<dyn CampaignStore>,
        inserts: std::sync::atomic::AtomicUsize,
        fail_at: usize,
    }

    #[async_trait::async_trait]
    impl PluginAdapter for FailingInsertStore {
        fn name(&self) -> &str {
            "failing-insert"
        }

        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }

        fn adapter_type(&self) -> wacast_core::AdapterType {
            wacast_core::AdapterType::Storage
        }

        async fn health_check(&self) -> Result<wacast_core::HealthStatus, CampaignError> {
            self.inner.health_check().await
        }

        async fn shutdown(&self) -> Result<(), CampaignError> {
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl CampaignStore for FailingInsertStore {
        async fn initialize(&self) -> Result<(), CampaignError> {
            Ok(())
        }

        async fn close(&self) -> Result<(), CampaignError> {
            Ok(())
        }

        async fn create_campaign(
            &self,
            campaign: &NewCampaign,
        ) -> Result<wacast_core::Campaign, CampaignError> {
            self.inner.create_campaign(campaign).await
        }

        async fn get_campaign(&self, id: i64) -> Result<Option<wacast_core::Campaign>, CampaignError> {
            self.inner.get_campaign(id).await
        }

        async fn list_campaigns(&self) -> Result<Vec<wacast_core::CampaignOverview>, CampaignError> {
            self.inner.list_campaigns().await
        }

        async fn delete_campaign(&self, id: i64) -> Result<bool, CampaignError> {
            self.inner.delete_campaign(id).await
        }

        async fn create_record(
            &self,
            campaign_id: i64,
            phone_number: &str,
        ) -> Result<wacast_core::SendRecord, CampaignError> {
            let n = self
                .inserts
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
                + 1;
            if n == self.fail_at {
                return Err(CampaignError::Internal("disk full".into()));
            }
            self.inner.create_record(campaign_id, phone_number).await
        }

        async fn records_for_campaign(
            &self,
            campaign_id: i64,
        ) -> Result<Vec<wacast_core::SendRecord>, CampaignError> {
            self.inner.records_for_campaign(campaign_id).await
        }

        async fn find_record_by_message_id(
            &self,
            message_id: &str,
        ) -> Result<Option<wacast_core::SendRecord>, CampaignError> {
            self.inner.find_record_by_message_id(message_id).await
        }

        async fn find_latest_by_phone_suffix(
            &self,
            suffix: &str,
        ) -> Result<Option<wacast_core::SuffixMatch>, CampaignError> {
            self.inner.find_latest_by_phone_suffix(suffix).await
        }

        async fn save_records(&self, records: &[wacast_core::SendRecord]) -> Result<(), CampaignError> {
            self.inner.save_records(records).await
        }
    }

    #[tokio::test]
    async fn storage_error_mid_loop_keeps_earlier_outcomes() {
        let harness = TestHarness::with_outcomes(vec![
            MockSender::accepted("wamid.FIRST"),
            MockSender::rejected("(#131026) Message undeliverable"),
        ])
        .await
        .unwrap();
        let store = Arc::new(FailingInsertStore {
            inner: harness.campaign_store(),
            inserts: std::sync::atomic::AtomicUsize::new(0),
            fail_at: 3,
        });
        let dispatcher = Dispatcher::new(store, harness.message_sender());

        let req = request(
            vec![
                candidate("9876543210", None),
                candidate("9876543211", None),
                candidate("9876543212", None),
            ],
            Some("91"),
        );
        let err = dispatcher.dispatch(&req).await.unwrap_err();
        assert!(matches!(err, CampaignError::Internal(_)));
        assert_eq!(harness.sender.calls().await.len(), 2);

        let campaigns = harness.store.list_campaigns().await.unwrap();
        let records = harness
            .store
            .records_for_campaign(campaigns[0].campaign.id)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, SendStatus::Sent);
        assert_eq!(records[0].provider_message_id.as_deref(), Some("wamid.FIRST"));
        assert_eq!(records[1].status, SendStatus::Failed);
        assert_eq!(
            records[1].error_message.as_deref(),
            Some("(#131026) Message undeliverable")
        );
    }
}
