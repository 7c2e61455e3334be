// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};
use wacast_core::{Campaign, CampaignError, CampaignOverview, HealthStatus, SendRecord};
use wacast_engine::{CampaignRequest, ReportSummary, render_document, report_filename};
use wacast_recipients::{RecipientCollector, rewrite_media_link};
use wacast_whatsapp::{verify_signature, verify_subscription};

use crate::auth::AuthConfig;
use crate::server::GatewayState;

/// Error response carrying the `{"status":"error","message":..}` body.
#[derive(Debug)]
pub struct ApiError(pub CampaignError);

impl From<CampaignError> for ApiError {
    fn from(e: CampaignError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            CampaignError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            CampaignError::NotFound { .. } => (StatusCode::NOT_FOUND, self.0.to_string()),
            CampaignError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({"status": "error", "message": message}))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

async fn load_campaign(state: &GatewayState, id: i64) -> ApiResult<Campaign> {
    state
        .store
        .get_campaign(id)
        .await?
        .ok_or_else(|| CampaignError::campaign_not_found(id).into())
}

// --- Public ---

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub storage: String,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let (status, storage) = match state.store.health_check().await {
        Ok(HealthStatus::Healthy) => ("ok", "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => ("degraded", reason),
        Ok(HealthStatus::Unhealthy(reason)) => ("unhealthy", reason),
        Err(e) => ("unhealthy", e.to_string()),
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        storage,
    })
}

/// Request body for POST /v1/login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /v1/login
pub async fn post_login(
    State(state): State<GatewayState>,
    Json(body): Json<LoginRequest>,
) -> Response {
    let auth: &AuthConfig = &state.auth;
    if !auth.check_credentials(&body.username, &body.password) {
        warn!(username = %body.username, "rejected operator login");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "error", "message": "Invalid credentials"})),
        )
            .into_response();
    }

    let now = chrono::Utc::now().timestamp();
    let Some((token, expires_at)) = auth.issue(now) else {
        return ApiError(CampaignError::Unauthorized).into_response();
    };
    let expires_at = chrono::DateTime::from_timestamp(expires_at, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();
    info!(username = %body.username, "operator logged in");

    (
        [(header::SET_COOKIE, auth.session_cookie(&token))],
        Json(json!({"token": token, "expires_at": expires_at})),
    )
        .into_response()
}

/// POST /v1/logout
pub async fn post_logout() -> Response {
    (
        [(header::SET_COOKIE, AuthConfig::clear_cookie())],
        Json(json!({"status": "success"})),
    )
        .into_response()
}

/// GET /webhook: subscription handshake.
pub async fn webhook_verify(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let challenge = verify_subscription(
        params.get("hub.mode").map(String::as_str),
        params.get("hub.verify_token").map(String::as_str),
        params.get("hub.challenge").map(String::as_str),
        state.webhook.verify_token.as_deref(),
    );
    match challenge {
        Some(challenge) => {
            info!("WhatsApp webhook verified");
            (StatusCode::OK, challenge).into_response()
        }
        None => {
            warn!("WhatsApp webhook verification failed");
            (StatusCode::FORBIDDEN, "Verification failed").into_response()
        }
    }
}

/// POST /webhook: status and reply callbacks.
///
/// Always answers 200 once the signature (if required) checks out, so the
/// provider does not retry payloads we cannot use.
pub async fn webhook_receive(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(secret) = state.webhook.app_secret.as_deref().filter(|s| !s.is_empty()) {
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok());
        if !verify_signature(secret, signature, &body) {
            warn!("webhook signature check failed");
            return (StatusCode::UNAUTHORIZED, "Invalid signature").into_response();
        }
    }

    state.reconciler.reconcile(&body).await;
    (StatusCode::OK, "OK").into_response()
}

// --- Campaigns ---

#[derive(Default)]
struct SubmissionForm {
    recipients: String,
    recipients_csv: Option<Vec<u8>>,
    recipients_sheet: Option<Vec<u8>>,
    message_title: String,
    message_body: String,
    media_link: String,
    campaign_title: String,
    default_country_code: String,
}

fn multipart_error(e: impl std::fmt::Display) -> ApiError {
    ApiError(CampaignError::Validation(format!("invalid form data: {e}")))
}

async fn read_form(mut multipart: Multipart) -> ApiResult<SubmissionForm> {
    let mut form = SubmissionForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "recipients_csv" | "recipients_sheet" => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.is_empty() {
                    continue;
                }
                if name == "recipients_csv" {
                    form.recipients_csv = Some(bytes.to_vec());
                } else {
                    form.recipients_sheet = Some(bytes.to_vec());
                }
            }
            _ => {
                let text = field.text().await.map_err(multipart_error)?;
                let text = text.trim().to_string();
                match name.as_str() {
                    "recipients" => form.recipients = text,
                    "message_title" => form.message_title = text,
                    "message_body" => form.message_body = text,
                    "media_link" => form.media_link = text,
                    "campaign_title" => form.campaign_title = text,
                    "default_country_code" => form.default_country_code = text,
                    _ => {}
                }
            }
        }
    }
    Ok(form)
}

/// POST /v1/campaigns (multipart)
pub async fn post_campaign(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let form = read_form(multipart).await?;

    let mut collector = RecipientCollector::new().with_text(&form.recipients);
    if let Some(csv) = &form.recipients_csv {
        collector = collector.with_csv_bytes(csv);
    }
    if let Some(sheet) = &form.recipients_sheet {
        collector = collector.with_spreadsheet_bytes(sheet);
    }
    let recipients = collector.collect()?;

    let request = CampaignRequest {
        title: form.campaign_title,
        message_title: form.message_title,
        message_body: form.message_body,
        media_link: rewrite_media_link(&form.media_link),
        default_country_code: Some(form.default_country_code).filter(|cc| !cc.is_empty()),
        recipients,
    };
    let report = state.dispatcher.dispatch(&request).await?;

    let mut body = json!({
        "status": "success",
        "campaign_id": report.campaign_id,
        "messages": report.messages(),
    });
    if !report.skipped.is_empty() {
        body["skipped"] = json!({"count": report.skipped.len(), "items": report.skipped});
    }
    Ok(Json(body))
}

/// GET /v1/campaigns
pub async fn list_campaigns(
    State(state): State<GatewayState>,
) -> ApiResult<Json<Vec<CampaignOverview>>> {
    Ok(Json(state.store.list_campaigns().await?))
}

/// Response body for GET /v1/campaigns/{id}.
#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    pub campaign: Campaign,
    pub summary: ReportSummary,
}

/// GET /v1/campaigns/{id}
pub async fn get_campaign(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CampaignDetail>> {
    let campaign = load_campaign(&state, id).await?;
    let records = state.store.records_for_campaign(id).await?;
    Ok(Json(CampaignDetail {
        campaign,
        summary: ReportSummary::from_records(&records),
    }))
}

/// GET /v1/campaigns/{id}/records
pub async fn get_records(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<SendRecord>>> {
    load_campaign(&state, id).await?;
    Ok(Json(state.store.records_for_campaign(id).await?))
}

/// GET /v1/campaigns/{id}/refill: the stored form values, for re-sending.
pub async fn get_refill(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let campaign = load_campaign(&state, id).await?;
    Ok(Json(json!({
        "campaign_title": campaign.title,
        "recipients": campaign.recipients_csv,
        "message_title": campaign.message_title,
        "message_body": campaign.message_body,
        "media_link": campaign.media_link.unwrap_or_default(),
    })))
}

/// GET /v1/campaigns/{id}/report: plain-text download.
pub async fn get_report(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let campaign = load_campaign(&state, id).await?;
    let records = state.store.records_for_campaign(id).await?;
    let document = render_document(&campaign, &ReportSummary::from_records(&records));
    let disposition = format!(
        "attachment; filename=\"{}\"",
        report_filename(&campaign.title)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    )
        .into_response())
}

/// DELETE /v1/campaigns/{id}
pub async fn delete_campaign(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    if !state.store.delete_campaign(id).await? {
        return Err(CampaignError::campaign_not_found(id).into());
    }
    info!(campaign_id = id, "campaign deleted");
    Ok(Json(json!({"status": "success"})))
}
