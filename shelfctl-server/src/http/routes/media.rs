//! Avatar upload endpoint
//!
//! The raw image is the request body; the response carries the relative
//! path to put in an author profile's `avatar` field.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Largest accepted upload
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

#[derive(Deserialize)]
pub struct UploadParams {
    pub filename: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub path: String,
    pub size: usize,
}

/// POST /media/avatars?filename=
async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let path = state.media.save_avatar(&params.filename, &body).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            path: path.into_string(),
            size: body.len(),
        }),
    ))
}

/// Media routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/media/avatars", post(upload_avatar))
        .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES))
}
