// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for wacast integration tests.
//!
//! Provides a scripted template sender and a harness with a throwaway
//! SQLite store, so campaign flows run without the network.
//!
//! # Components
//!
//! - [`MockSender`] - Sender that replays queued outcomes and records calls
//! - [`TestHarness`] - Temp-dir SQLite store plus a mock sender

pub mod harness;
pub mod mock_sender;

pub use harness::TestHarness;
pub use mock_sender::MockSender;
