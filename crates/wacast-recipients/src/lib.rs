// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipient intake for wacast campaigns.
//!
//! Turns free text, CSV uploads, and spreadsheets into a deduplicated list
//! of canonical phone candidates with optional per-row country-code hints.

pub mod collector;
pub mod country;
pub mod media;
pub mod normalize;

pub use collector::{Candidate, CollectedRecipients, RecipientCollector};
pub use country::{accept_length, country_code_digits, resolve_country_code};
pub use media::rewrite_media_link;
pub use normalize::{CellValue, cell_to_text, normalize, normalize_phone};
