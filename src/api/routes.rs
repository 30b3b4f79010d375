//! API route definitions.

use std::str::FromStr;

use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use super::state::AppState;
use crate::classify::{classify, Detection, Severity};
use crate::identity::VerifiedUser;
use crate::rollup::period::long_date;
use crate::rollup::{aggregate, Period, RollupStore, StatsError};

/// Header carrying the verified email, set by the upstream auth proxy.
const IDENTITY_HEADER: &str = "x-screenward-user";

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/detections", post(post_detections))
        .route("/detections/image", post(post_detection_image))
        .route("/statistics", get(get_statistics))
        .route("/statistics/seed", post(post_seed))
}

/// Error envelope mapping the stats taxonomy onto HTTP statuses.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<StatsError> for ApiError {
    fn from(e: StatsError) -> Self {
        match e {
            StatsError::Validation(msg) => Self::bad_request(msg),
            StatsError::Persistence(msg) => Self::internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn verified_user(headers: &HeaderMap) -> Result<VerifiedUser, ApiError> {
    let raw = headers
        .get(IDENTITY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::UNAUTHORIZED,
                "verified user identity not present",
            )
        })?;
    VerifiedUser::parse(raw).map_err(ApiError::from)
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

#[derive(Debug, Deserialize)]
struct DetectRequest {
    application: String,
    #[serde(default)]
    detections: Vec<Detection>,
    #[serde(default)]
    filename: Option<String>,
}

async fn post_detections(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DetectRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = verified_user(&headers)?;
    if req.application.trim().is_empty() {
        return Err(ApiError::bad_request("Application parameter is required"));
    }

    let severity = classify(&req.detections);
    record_if_flagged(&state, &user, &req.application, severity).await;

    Ok(Json(json!({
        "filename": req.filename,
        "severity": severity.level(),
        "severityLabel": severity.to_string(),
        "detectionResults": req.detections,
        "status": "success",
        "eventId": uuid::Uuid::new_v4(),
    })))
}

async fn post_detection_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let user = verified_user(&headers)?;
    let scorer = state
        .scorer
        .clone()
        .ok_or_else(|| ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "no scorer configured"))?;

    let mut application = None;
    let mut image = None;
    let mut filename = String::from("upload");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("application") => {
                application = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("invalid application field: {e}"))
                })?);
            }
            Some("image") => {
                if let Some(name) = field.file_name() {
                    filename = name.to_string();
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid image field: {e}")))?;
                image = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let application =
        application.ok_or_else(|| ApiError::bad_request("Application parameter is required"))?;
    let image = image.ok_or_else(|| ApiError::bad_request("Image file is required"))?;

    let detections = scorer
        .score(&filename, image)
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, format!("scorer failed: {e:#}")))?;

    let severity = classify(&detections);
    record_if_flagged(&state, &user, &application, severity).await;

    Ok(Json(json!({
        "filename": filename,
        "severity": severity.level(),
        "severityLabel": severity.to_string(),
        "detectionResults": detections,
        "status": "success",
        "eventId": uuid::Uuid::new_v4(),
    })))
}

/// Record a qualifying event. Failures are logged, not surfaced: the
/// classification already succeeded and the response still reports it.
async fn record_if_flagged(
    state: &AppState,
    user: &VerifiedUser,
    application: &str,
    severity: Severity,
) {
    if severity == Severity::Safe {
        return;
    }

    let store = RollupStore::new(state.pool.clone());
    let user = user.clone();
    let application = application.to_string();
    let result = tokio::task::spawn_blocking(move || {
        store.record_event(&user, &application, severity, Local::now().date_naive())
    })
    .await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "failed to record severity event"),
        Err(e) => error!(error = %e, "severity recording task panicked"),
    }
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    period: Option<String>,
}

async fn get_statistics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let user = verified_user(&headers)?;
    let period_str = query.period.ok_or_else(|| {
        ApiError::bad_request(format!(
            "Period parameter is required. Options: {}",
            Period::VALID_OPTIONS
        ))
    })?;
    let period = Period::from_str(&period_str)?;

    let now = Local::now();
    let (start, end) = period.date_range(now);

    let store = RollupStore::new(state.pool.clone());
    let query_user = user.clone();
    let range = tokio::task::spawn_blocking(move || store.query_range(&query_user, start, end))
        .await
        .map_err(|e| ApiError::internal(format!("statistics task failed: {e}")))??;

    let statistics = aggregate(&range.records, period);

    Ok(Json(json!({
        "period": period.to_string(),
        "email": user.email(),
        "startDate": long_date(start),
        "endDate": long_date(end),
        "statistics": statistics,
        "skippedDays": range.skipped_days,
        "status": "success",
    })))
}

#[derive(Debug, Deserialize)]
struct SeedRequest {
    email: String,
    #[serde(default = "default_seed_days")]
    days: u32,
}

fn default_seed_days() -> u32 {
    30
}

/// Dev-only: generate dummy historical statistics for a user.
async fn post_seed(
    State(state): State<AppState>,
    Json(req): Json<SeedRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = VerifiedUser::parse(&req.email)?;
    let pool = state.pool.clone();
    let days = req.days;

    let written =
        tokio::task::spawn_blocking(move || crate::seed::seed_history(&pool, &user, days))
            .await
            .map_err(|e| ApiError::internal(format!("seed task failed: {e}")))??;

    Ok(Json(json!({
        "daysSeeded": written,
        "status": "success",
    })))
}
