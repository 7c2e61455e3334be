// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gathers candidate numbers from every recipient source of one submission.
//!
//! Sources are read in a fixed order (CSV upload, spreadsheet upload, free
//! text) and the merged list is deduplicated on `(phone, hint)` keeping the
//! first occurrence.

use std::collections::HashSet;
use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use serde::Serialize;
use tracing::debug;
use wacast_core::CampaignError;

use crate::country::country_code_digits;
use crate::normalize::{CellValue, cell_to_text, normalize, normalize_phone};

/// A normalized phone number, optionally tagged with the country code its
/// source row carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub phone: String,
    pub hint: Option<String>,
}

/// Deduplicated candidates plus the raw inputs that did not normalize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectedRecipients {
    pub candidates: Vec<Candidate>,
    pub skipped: Vec<String>,
}

enum SheetSource {
    Bytes(Vec<u8>),
    Rows(Vec<Vec<CellValue>>),
}

/// Builder over the recipient sources of one campaign submission.
#[derive(Default)]
pub struct RecipientCollector {
    text: Option<String>,
    csv: Option<Vec<u8>>,
    sheet: Option<SheetSource>,
}

impl RecipientCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free text: numbers separated by commas, semicolons, or newlines.
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// An uploaded CSV file, one or more numbers per row.
    pub fn with_csv_bytes(mut self, bytes: &[u8]) -> Self {
        self.csv = Some(bytes.to_vec());
        self
    }

    /// An uploaded workbook (xlsx, xls, or ods).
    pub fn with_spreadsheet_bytes(mut self, bytes: &[u8]) -> Self {
        self.sheet = Some(SheetSource::Bytes(bytes.to_vec()));
        self
    }

    /// Spreadsheet rows that were already decoded.
    pub fn with_sheet_rows(mut self, rows: Vec<Vec<CellValue>>) -> Self {
        self.sheet = Some(SheetSource::Rows(rows));
        self
    }

    pub fn collect(self) -> Result<CollectedRecipients, CampaignError> {
        let mut acc = Accumulator::default();

        if let Some(bytes) = &self.csv {
            collect_csv(bytes, &mut acc)?;
        }
        match self.sheet {
            Some(SheetSource::Bytes(bytes)) => collect_rows(&read_sheet_rows(&bytes)?, &mut acc),
            Some(SheetSource::Rows(rows)) => collect_rows(&rows, &mut acc),
            None => {}
        }
        if let Some(text) = &self.text {
            collect_text(text, &mut acc);
        }

        debug!(
            candidates = acc.out.candidates.len(),
            skipped = acc.out.skipped.len(),
            "recipients collected"
        );
        Ok(acc.out)
    }
}

#[derive(Default)]
struct Accumulator {
    seen: HashSet<(String, String)>,
    out: CollectedRecipients,
}

impl Accumulator {
    fn push(&mut self, phone: String, hint: Option<String>) {
        let key = (phone.clone(), hint.clone().unwrap_or_default());
        if self.seen.insert(key) {
            self.out.candidates.push(Candidate { phone, hint });
        }
    }

    fn skip(&mut self, raw: impl Into<String>) {
        self.out.skipped.push(raw.into());
    }
}

fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1: every byte is its own code point.
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn collect_csv(bytes: &[u8], acc: &mut Accumulator) -> Result<(), CampaignError> {
    let text = decode_text(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    for record in reader.records() {
        let record = record.map_err(|e| {
            CampaignError::Validation(format!("failed reading uploaded CSV: {e}"))
        })?;
        for cell in record.iter().map(str::trim).filter(|c| !c.is_empty()) {
            match normalize_phone(cell) {
                Some(phone) => acc.push(phone, None),
                None => acc.skip(cell),
            }
        }
    }
    Ok(())
}

/// Decode the first worksheet of a workbook into cells.
pub fn read_sheet_rows(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>, CampaignError> {
    let invalid = |e: &dyn std::fmt::Display| {
        CampaignError::Validation(format!("failed reading spreadsheet: {e}"))
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| invalid(&e))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| invalid(&e))?,
        None => return Ok(Vec::new()),
    };

    Ok(range_rows(&range))
}

/// Rows anchored at column A. A calamine range starts at its first used
/// cell, so leading empty columns are put back as `Empty`.
fn range_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let offset = range.start().map_or(0, |(_, col)| col as usize);
    range
        .rows()
        .map(|row| {
            std::iter::repeat_n(CellValue::Empty, offset)
                .chain(row.iter().map(cell_from_data))
                .collect()
        })
        .collect()
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Empty => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

fn raw_text(cell: &CellValue) -> String {
    cell.to_string().trim().to_string()
}

fn collect_rows(rows: &[Vec<CellValue>], acc: &mut Accumulator) {
    for row in rows {
        if row.iter().all(CellValue::is_blank) {
            continue;
        }

        if row.len() >= 2 && !row[0].is_blank() && !row[1].is_blank() {
            let hint = country_code_digits(&cell_to_text(&row[0]));
            match normalize(&row[1]) {
                Some(phone) => acc.push(phone, hint),
                None => acc.skip(format!("{},{}", raw_text(&row[0]), raw_text(&row[1]))),
            }
            continue;
        }

        if let Some(cell) = row.iter().find(|c| !c.is_blank()) {
            match normalize(cell) {
                Some(phone) => acc.push(phone, None),
                None => acc.skip(raw_text(cell)),
            }
        }
    }
}

fn collect_text(text: &str, acc: &mut Accumulator) {
    // Only empty splits are dropped; blank tokens are reported as skipped.
    for token in text.split([',', '\n', ';']).filter(|t| !t.is_empty()) {
        match normalize_phone(token) {
            Some(phone) => acc.push(phone, None),
            None => acc.skip(token),
        }
    }
}
