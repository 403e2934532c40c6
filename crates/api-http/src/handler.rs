//! Route Handlers
//!
//! Each handler validates nothing itself; the core services do, and their
//! errors are converted by `ApiError`.

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::server::AppState;
use crate::types::{ListResponse, OpenRequest, OpenResponse, SaveRequest};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use pprofit_core::domain::Artifact;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /profiles
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<ListResponse>, ApiError> {
    let profiles = state.profiles.list().await?;
    Ok(Json(ListResponse { profiles }))
}

/// POST /save
pub async fn save_profile(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SaveRequest>,
) -> Result<Json<Artifact>, ApiError> {
    let artifact = state.profiles.save(&req.url, &req.profile_type).await?;
    Ok(Json(artifact))
}

/// POST /open
pub async fn open_profile(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<OpenRequest>,
) -> Result<Json<OpenResponse>, ApiError> {
    state.supervisor.open(&req.name).await?;
    Ok(Json(OpenResponse { success: true }))
}

/// Unknown path or wrong method
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
