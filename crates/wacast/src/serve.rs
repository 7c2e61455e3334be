// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wacast serve` command implementation.
//!
//! Opens SQLite storage, builds the WhatsApp sender, wires the dispatcher
//! and reconciler into the gateway, and serves until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use wacast_config::model::WacastConfig;
use wacast_core::{CampaignError, CampaignStore, HealthStatus, PluginAdapter};
use wacast_engine::{Dispatcher, Reconciler};
use wacast_gateway::{AuthConfig, GatewayState, ServerConfig, WebhookConfig};
use wacast_storage::SqliteStorage;
use wacast_whatsapp::WhatsAppSender;

/// Runs the `wacast serve` command.
pub async fn run_serve(config: WacastConfig) -> Result<(), CampaignError> {
    info!("starting wacast serve");

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let store: Arc<dyn CampaignStore> = Arc::new(storage);

    let sender = WhatsAppSender::new(&config.whatsapp)?;
    match sender.health_check().await? {
        HealthStatus::Healthy => {}
        HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => {
            warn!(reason = %reason, "WhatsApp sender is not ready, sends will be rejected");
        }
    }

    let auth = AuthConfig::from_config(&config.auth);
    if !auth.enabled() {
        warn!("auth.password is not set; operator logins are disabled");
    }
    if config.whatsapp.webhook_verify_token.is_none() {
        warn!("whatsapp.webhook_verify_token is not set; webhook handshakes will fail");
    }

    let state = GatewayState {
        store: store.clone(),
        dispatcher: Dispatcher::new(store.clone(), Arc::new(sender)),
        reconciler: Reconciler::new(store.clone()),
        auth,
        webhook: WebhookConfig {
            verify_token: config.whatsapp.webhook_verify_token.clone(),
            app_secret: config.whatsapp.app_secret.clone(),
        },
        start_time: Instant::now(),
    };
    let server_config = ServerConfig {
        host: config.gateway.bind_address.clone(),
        port: config.gateway.port,
        max_upload_bytes: config.gateway.max_upload_bytes,
    };

    wacast_gateway::start_server(&server_config, state, shutdown_signal()).await?;

    store.close().await?;
    info!("wacast serve shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or on SIGTERM under unix.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                    _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                let _ = ctrl_c.await;
                info!("received Ctrl+C, initiating shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("received Ctrl+C, initiating shutdown");
    }

    debug!("shutdown signal handled");
}
