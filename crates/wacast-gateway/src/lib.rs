// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for wacast.
//!
//! Serves the operator API (login, campaign submission, history, reports)
//! and the WhatsApp webhook endpoint that feeds status reconciliation.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{GatewayState, ServerConfig, WebhookConfig, build_router, start_server};
