use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ReserveError;
use crate::handlers::{Outcome, ReservationHandler};

const INVALID_REQUEST: &str = "sku, qty>0, request_id required";

#[derive(Clone)]
pub struct AppState {
    pub handler: ReservationHandler,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReserveRequest {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub qty: i64,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReserveResponse {
    Reserved { remaining: i64 },
    Duplicate { status: &'static str, request_id: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: &str) -> ApiError {
    (status, Json(ErrorResponse { error: error.to_string() }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reserve", post(reserve))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

/// An empty body is read as `{}` so it fails validation like any other
/// request with missing fields.
fn parse_request(body: &[u8]) -> Result<ReserveRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReserveRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejecting malformed reserve body: {}", e);
        api_error(StatusCode::BAD_REQUEST, INVALID_REQUEST)
    })
}

pub async fn reserve(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ReserveResponse>, ApiError> {
    let request = parse_request(&body)?;

    match state.handler.reserve(&request.sku, request.qty, &request.request_id).await {
        Ok(Outcome::Reserved { remaining }) => Ok(Json(ReserveResponse::Reserved { remaining })),
        Ok(Outcome::Duplicate { request_id }) => Ok(Json(ReserveResponse::Duplicate {
            status: "duplicate",
            request_id,
        })),
        Ok(Outcome::Insufficient { .. }) => Err(api_error(StatusCode::CONFLICT, "insufficient")),
        Err(ReserveError::InvalidRequest { .. }) => {
            Err(api_error(StatusCode::BAD_REQUEST, INVALID_REQUEST))
        }
        Err(ReserveError::StoreUnavailable { .. }) => {
            Err(api_error(StatusCode::SERVICE_UNAVAILABLE, "store unavailable"))
        }
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}
