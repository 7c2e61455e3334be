// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wacast preview`: run recipient collection and country-code resolution
//! over local inputs and print the result. Nothing is stored or sent.

use std::path::PathBuf;

use wacast_core::CampaignError;
use wacast_engine::{CampaignRequest, DispatchPlan, plan_recipients};
use wacast_recipients::RecipientCollector;

/// Inputs of `wacast preview`.
#[derive(Debug, Default)]
pub struct PreviewArgs {
    pub text: Option<String>,
    pub csv: Option<PathBuf>,
    pub sheet: Option<PathBuf>,
    pub default_cc: Option<String>,
}

fn read_file(path: &PathBuf) -> Result<Vec<u8>, CampaignError> {
    std::fs::read(path).map_err(|e| {
        CampaignError::Validation(format!("cannot read {}: {e}", path.display()))
    })
}

/// Resolve the inputs to the numbers a campaign would reach.
pub fn plan_preview(args: &PreviewArgs) -> Result<DispatchPlan, CampaignError> {
    let csv = args.csv.as_ref().map(read_file).transpose()?;
    let sheet = args.sheet.as_ref().map(read_file).transpose()?;

    let mut collector = RecipientCollector::new().with_text(args.text.as_deref().unwrap_or(""));
    if let Some(csv) = &csv {
        collector = collector.with_csv_bytes(csv);
    }
    if let Some(sheet) = &sheet {
        collector = collector.with_spreadsheet_bytes(sheet);
    }

    plan_recipients(&CampaignRequest {
        title: "preview".into(),
        default_country_code: args.default_cc.clone(),
        recipients: collector.collect()?,
        ..CampaignRequest::default()
    })
}

/// Runs the `wacast preview` command.
pub fn run_preview(args: PreviewArgs) -> Result<(), CampaignError> {
    let plan = plan_preview(&args)?;
    println!("{} number(s) would be messaged:", plan.numbers.len());
    for number in &plan.numbers {
        println!("  {number}");
    }
    if !plan.skipped.is_empty() {
        println!("{} item(s) skipped:", plan.skipped.len());
        for item in &plan.skipped {
            println!("  {item}");
        }
    }
    Ok(())
}
