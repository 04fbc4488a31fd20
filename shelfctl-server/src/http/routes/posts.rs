//! Post endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use shelfctl_core::models::{Paginated, Pagination, PaginationParams, Post, PostInput};

use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, RecordId};
use crate::http::server::AppState;

/// GET /posts
async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<Post>>, ApiError> {
    let page = Pagination::from(params);
    Ok(Json(state.store.list_posts(page).await?))
}

/// POST /posts - `created_at` is assigned by the store
async fn create_post(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<PostInput>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.store.create_post(input.validate()?).await?;
    tracing::info!(id = post.id, author_id = ?post.author_id, "post created");

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts/{id}
async fn get_post(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.store.get_post(id).await?))
}

/// PUT /posts/{id}
async fn update_post(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    JsonBody(input): JsonBody<PostInput>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.store.update_post(id, input.validate()?).await?))
}

/// DELETE /posts/{id}
async fn delete_post(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<StatusCode, ApiError> {
    state.store.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}
