//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::dto::{DeparturesRequest, ErrorResponse, StopSearchRequest};
use super::state::AppState;
use crate::domain::{BoardOptions, Departure, StopCandidate};
use crate::efa::{EfaApi, EfaError};
use crate::resolve::StopQuery;
use crate::track::filter_by_track;

/// Create the application router.
pub fn create_router<C: EfaApi + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops/search", get(search_stops::<C>))
        .route("/api/stops/:stop_id", get(stop_departures::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Search for stops by free text.
async fn search_stops<C: EfaApi + 'static>(
    State(state): State<AppState<C>>,
    Query(req): Query<StopSearchRequest>,
) -> Result<Json<Vec<StopCandidate>>, AppError> {
    let include_location = req.include_location();
    let Some(text) = req.q else {
        return Err(AppError::BadRequest {
            message: "Missing 'q' parameter".to_string(),
        });
    };

    let mut query = StopQuery::new(text).with_location(include_location);
    if let Some(city) = req.city {
        query = query.with_city(city);
    }

    let stops = state.efa.search_stops(&query).await?;
    info!(query = %query.text, results = stops.len(), "stop search");
    Ok(Json(stops))
}

/// Departure board for one stop, optionally filtered by track.
async fn stop_departures<C: EfaApi + 'static>(
    State(state): State<AppState<C>>,
    Path(stop_id): Path<String>,
    Query(req): Query<DeparturesRequest>,
) -> Result<Json<Vec<Departure>>, AppError> {
    let options = BoardOptions {
        detailed: req.detailed(),
        include_delay: req.include_delay(),
    };

    let board = state.efa.departures(&stop_id, options).await?;

    let departures = match req.track() {
        Some(track) => filter_by_track(board.iter(), track),
        None => board.as_ref().clone(),
    };

    Ok(Json(departures))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    BadGateway { message: String },
}

impl From<EfaError> for AppError {
    fn from(e: EfaError) -> Self {
        AppError::BadGateway {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
