//! Admin REST API — settings, lead dashboard, and engine status.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::intake::DialogueEngine;
use crate::leads::LeadLedger;
use crate::settings::{Settings, SettingsStore};

const DEFAULT_LEADS_LIMIT: usize = 50;
const MAX_LEADS_LIMIT: usize = 500;

/// Shared state for the admin routes.
#[derive(Clone)]
pub struct AdminState {
    pub settings: Arc<SettingsStore>,
    pub ledger: Arc<dyn LeadLedger>,
    pub engine: Arc<DialogueEngine>,
}

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (status, Json(serde_json::json!({"error": message.to_string()}))).into_response()
}

/// GET /api/settings
async fn get_settings(State(state): State<AdminState>) -> impl IntoResponse {
    Json(state.settings.get().await)
}

/// PUT /api/settings
///
/// Replaces the whole settings document and persists it.
async fn put_settings(
    State(state): State<AdminState>,
    Json(settings): Json<Settings>,
) -> Response {
    match state.settings.save(settings).await {
        Ok(()) => Json(state.settings.get().await).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save settings");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/// GET /api/leads/stats
async fn get_lead_stats(State(state): State<AdminState>) -> Response {
    match state.ledger.stats(Utc::now()).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to compute lead stats");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

#[derive(Debug, Deserialize)]
struct LeadsQuery {
    limit: Option<usize>,
}

/// GET /api/leads?limit=N
///
/// Most recent leads first. `limit` defaults to 50 and is capped at 500.
async fn list_leads(State(state): State<AdminState>, Query(query): Query<LeadsQuery>) -> Response {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADS_LIMIT)
        .min(MAX_LEADS_LIMIT);

    match state.ledger.recent(limit).await {
        Ok(leads) => Json(leads).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list leads");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/// GET /api/status
async fn get_status(State(state): State<AdminState>) -> impl IntoResponse {
    Json(state.engine.status().await)
}

/// Build the admin REST routes.
pub fn admin_routes(state: AdminState) -> Router {
    Router::new()
        .route("/api/settings", get(get_settings).put(put_settings))
        .route("/api/leads/stats", get(get_lead_stats))
        .route("/api/leads", get(list_leads))
        .route("/api/status", get(get_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
