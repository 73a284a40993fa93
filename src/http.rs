//! HTTP transport - maps JSON requests to rotator operations.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health` - `{ "ok": true }`.
//! - `POST /slots`, `POST /banners`, `POST /groups` - body `{ "description": .. }`,
//!   returns the created entity.
//! - `POST /rotations`, `DELETE /rotations` - body `{ "slot_id": .., "banner_id": .. }`.
//! - `POST /clicks` - body `{ "slot_id": .., "banner_id": .., "group_id": .. }`.
//! - `POST /selections` - body `{ "slot_id": .., "group_id": .. }`, returns the
//!   banner to show (its view is already recorded).
//!
//! Errors are `{ "error": "<message>" }` with status from
//! `RotatorError::status_code`, or 400 for invalid input (including bodies
//! that are not valid JSON or miss a field).
//!
//! With slot locking enabled a selection may block on another one for the
//! same slot, so it runs on tokio's blocking pool.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::bus::Publisher;
use crate::model::{Banner, GroupId, SlotId};
use crate::request::{
    ClickRequest, DescriptionRequest, InvalidRequest, RotationRequest, SelectionRequest,
};
use crate::rotator::{Rotator, RotatorError};
use crate::storage::Storage;

type Shared<S, P> = State<Arc<Rotator<S, P>>>;
type Body<T> = Result<Json<T>, JsonRejection>;

/// Build an axum `Router` backed by the given rotator.
pub fn router<S, P>(rotator: Arc<Rotator<S, P>>) -> Router
where
    S: Storage + 'static,
    P: Publisher + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/slots", post(create_slot::<S, P>))
        .route("/banners", post(create_banner::<S, P>))
        .route("/groups", post(create_group::<S, P>))
        .route(
            "/rotations",
            post(create_rotation::<S, P>).delete(delete_rotation::<S, P>),
        )
        .route("/clicks", post(record_click::<S, P>))
        .route("/selections", post(select_banner::<S, P>))
        .with_state(rotator)
}

/// Serve the rotator over HTTP at the given address (e.g. `"0.0.0.0:8080"`).
pub async fn serve<S, P>(rotator: Arc<Rotator<S, P>>, addr: &str) -> Result<(), std::io::Error>
where
    S: Storage + 'static,
    P: Publisher + 'static,
{
    let app = router(rotator);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http transport listening");
    axum::serve(listener, app).await
}

enum ApiError {
    Invalid(InvalidRequest),
    Malformed(JsonRejection),
    Rotator(RotatorError),
    Internal(String),
}

impl From<InvalidRequest> for ApiError {
    fn from(err: InvalidRequest) -> Self {
        ApiError::Invalid(err)
    }
}

impl From<RotatorError> for ApiError {
    fn from(err: RotatorError) -> Self {
        ApiError::Rotator(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Invalid(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Malformed(rejection) => (
                StatusCode::BAD_REQUEST,
                format!("bad request: {}", rejection.body_text()),
            ),
            ApiError::Rotator(err) => {
                tracing::error!(error = %err, stage = ?err.failure_stage(), "request failed");
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, err.to_string())
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn body<T>(payload: Body<T>) -> Result<T, ApiError> {
    payload.map(|Json(req)| req).map_err(ApiError::Malformed)
}

async fn select<S, P>(
    rotator: Arc<Rotator<S, P>>,
    slot: SlotId,
    group: GroupId,
) -> Result<Banner, ApiError>
where
    S: Storage + 'static,
    P: Publisher + 'static,
{
    if !rotator.serializes_selection() {
        return Ok(rotator.select_banner(slot, group)?);
    }
    tokio::task::spawn_blocking(move || rotator.select_banner(slot, group))
        .await
        .map_err(|err| ApiError::Internal(format!("selection task failed: {err}")))?
        .map_err(ApiError::from)
}

fn ok<T: Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

fn message(text: &str) -> Response {
    ok(json!({ "message": text }))
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn create_slot<S: Storage, P: Publisher>(
    State(rotator): Shared<S, P>,
    payload: Body<DescriptionRequest>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    let slot = rotator.create_slot(req.validate()?)?;
    Ok(ok(slot))
}

async fn create_banner<S: Storage, P: Publisher>(
    State(rotator): Shared<S, P>,
    payload: Body<DescriptionRequest>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    let banner = rotator.create_banner(req.validate()?)?;
    Ok(ok(banner))
}

async fn create_group<S: Storage, P: Publisher>(
    State(rotator): Shared<S, P>,
    payload: Body<DescriptionRequest>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    let group = rotator.create_group(req.validate()?)?;
    Ok(ok(group))
}

async fn create_rotation<S: Storage, P: Publisher>(
    State(rotator): Shared<S, P>,
    payload: Body<RotationRequest>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    let (slot, banner) = req.validate()?;
    rotator.create_rotation(slot, banner)?;
    Ok(message("Rotation was created"))
}

async fn delete_rotation<S: Storage, P: Publisher>(
    State(rotator): Shared<S, P>,
    payload: Body<RotationRequest>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    let (slot, banner) = req.validate()?;
    rotator.delete_rotation(slot, banner)?;
    Ok(message("Rotation was deleted"))
}

async fn record_click<S: Storage, P: Publisher>(
    State(rotator): Shared<S, P>,
    payload: Body<ClickRequest>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    let (slot, banner, group) = req.validate()?;
    rotator.record_click(slot, banner, group)?;
    Ok(message("Click event was registered"))
}

async fn select_banner<S: Storage + 'static, P: Publisher + 'static>(
    State(rotator): Shared<S, P>,
    payload: Body<SelectionRequest>,
) -> Result<Response, ApiError> {
    let req = body(payload)?;
    let (slot, group) = req.validate()?;
    let banner = select(rotator, slot, group).await?;
    Ok(ok(banner))
}
