// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign engine for wacast.
//!
//! - [`Dispatcher`] validates a submission, persists the campaign, and
//!   sends the template to every accepted number exactly once
//! - [`Reconciler`] folds provider webhook callbacks into send records
//! - [`report`] projects records into delivery statistics and a
//!   downloadable document

pub mod dispatch;
pub mod reconcile;
pub mod report;

pub use dispatch::{
    CampaignRequest, DispatchLine, DispatchPlan, DispatchReport, Dispatcher, plan_recipients,
};
pub use reconcile::{ReconcileSummary, Reconciler};
pub use report::{ReportSummary, render_document, report_filename};
