//! JSON control endpoints for the monitor

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::config::MonitorConfig;
use crate::engine::Engine;

/// API application state
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<Engine>,
}

/// Build the axum router for the control API
pub fn build_router(engine: Arc<Engine>) -> Router {
    let api_state = ApiState { engine };

    Router::new()
        .route("/api/monitor", post(monitor_handler))
        .route("/api/status", get(status_handler))
        .route("/health", get(health_handler))
        .with_state(api_state)
}

/// Body of a POST /api/monitor request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRequest {
    pub action: String,
    #[serde(default)]
    pub config: Option<RequestConfig>,
    #[serde(default)]
    pub use_puppeteer: Option<bool>,
}

/// Credentials as sent on the wire, all fields optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    #[serde(default)]
    pub work_card_number: Option<String>,
    #[serde(default)]
    pub national_id_number: Option<String>,
    #[serde(default)]
    pub email_to: Option<String>,
}

/// Both identifiers must be present and non-empty; length validation
/// happens later in the check itself.
fn monitor_config_of(config: Option<RequestConfig>) -> Option<MonitorConfig> {
    let config = config.unwrap_or_default();
    let work_card_number = config.work_card_number.unwrap_or_default();
    let national_id_number = config.national_id_number.unwrap_or_default();

    if work_card_number.is_empty() || national_id_number.is_empty() {
        return None;
    }

    Some(MonitorConfig {
        work_card_number,
        national_id_number,
        email_to: config.email_to,
    })
}

async fn monitor_handler(
    State(api): State<ApiState>,
    Json(request): Json<MonitorRequest>,
) -> Response {
    tracing::debug!("Monitor action '{}' requested", request.action);

    match request.action.as_str() {
        "start" => start_action(&api, request).await,
        "stop" => stop_action(&api).await,
        "check" => check_action(&api, request).await,
        "test-email" => test_email_action(&api, request).await,
        other => {
            tracing::warn!("Unknown action '{}'", other);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": "Action inconnue" })),
            )
                .into_response()
        }
    }
}

async fn start_action(api: &ApiState, request: MonitorRequest) -> Response {
    let Some(config) = monitor_config_of(request.config) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Informations ANEM manquantes (numéro carte + ID national requis)",
            })),
        )
            .into_response();
    };

    let report = api.engine.start(config).await;
    let minutes = (api.engine.check_interval().as_secs() / 60).max(1);
    let message = if report.email_configured {
        format!(
            "Monitoring démarré avec notifications email - vérification toutes les {minutes} minutes"
        )
    } else {
        format!(
            "Monitoring démarré SANS email (configurez Web3Forms) - vérification toutes les {minutes} minutes"
        )
    };

    Json(json!({
        "success": true,
        "message": message,
        "emailConfigured": report.email_configured,
        "initialResult": report.initial_result,
    }))
    .into_response()
}

async fn stop_action(api: &ApiState) -> Response {
    api.engine.stop().await;
    Json(json!({ "success": true, "message": "Monitoring arrêté" })).into_response()
}

async fn check_action(api: &ApiState, request: MonitorRequest) -> Response {
    let Some(config) = monitor_config_of(request.config) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Informations ANEM manquantes" })),
        )
            .into_response();
    };

    let include_on_demand = request.use_puppeteer.unwrap_or(false);
    let result = api.engine.check_once(&config, include_on_demand).await;
    Json(result).into_response()
}

async fn test_email_action(api: &ApiState, request: MonitorRequest) -> Response {
    let email_to = request
        .config
        .and_then(|config| config.email_to)
        .filter(|to| !to.is_empty());

    let Some(email_to) = email_to else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Email de destination manquant" })),
        )
            .into_response();
    };

    let outcome = api.engine.test_notification(&email_to).await;
    Json(outcome).into_response()
}

async fn status_handler(State(api): State<ApiState>) -> impl IntoResponse {
    let session = api.engine.session().read().await;

    Json(json!({
        "running": session.is_running(),
        "lastStatus": session.last_status,
        "emailConfigured": api.engine.has_notifier(),
        "lastResult": &session.last_result,
        "history": &session.history,
    }))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
