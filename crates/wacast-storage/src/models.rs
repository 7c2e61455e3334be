// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types live in `wacast-core::types` because they cross the
//! adapter trait boundary. They are re-exported here for convenience.

pub use wacast_core::types::{Campaign, CampaignOverview, NewCampaign, SendRecord, SendStatus};
