//! Author profile endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use shelfctl_core::models::{
    AuthorProfile, AuthorProfileInput, AvatarPath, Paginated, Pagination, PaginationParams,
    ValidationError,
};

use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, RecordId};
use crate::http::server::AppState;

/// GET /author-profiles
async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<AuthorProfile>>, ApiError> {
    let page = Pagination::from(params);
    Ok(Json(state.store.list_profiles(page).await?))
}

/// The avatar must name an uploaded file.
async fn ensure_uploaded(state: &AppState, avatar: &AvatarPath) -> Result<(), ApiError> {
    if state.media.exists(avatar).await? {
        return Ok(());
    }
    Err(ValidationError::InvalidFormat {
        field: "avatar",
        reason: "no uploaded image at this path",
    }
    .into())
}

/// POST /author-profiles - one per author
async fn create_profile(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<AuthorProfileInput>,
) -> Result<(StatusCode, Json<AuthorProfile>), ApiError> {
    let profile = input.validate()?;
    ensure_uploaded(&state, &profile.avatar).await?;

    let profile = state.store.create_profile(profile).await?;
    tracing::info!(id = profile.id, author_id = profile.author_id, "profile created");

    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /author-profiles/{id}
async fn get_profile(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<Json<AuthorProfile>, ApiError> {
    Ok(Json(state.store.get_profile(id).await?))
}

/// PUT /author-profiles/{id}
async fn update_profile(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    JsonBody(input): JsonBody<AuthorProfileInput>,
) -> Result<Json<AuthorProfile>, ApiError> {
    let profile = input.validate()?;
    ensure_uploaded(&state, &profile.avatar).await?;

    Ok(Json(state.store.update_profile(id, profile).await?))
}

/// DELETE /author-profiles/{id}
async fn delete_profile(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<StatusCode, ApiError> {
    state.store.delete_profile(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Author profile routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/author-profiles", get(list_profiles).post(create_profile))
        .route(
            "/author-profiles/{id}",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
}
