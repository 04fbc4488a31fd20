//! Author endpoints, including the `posts` and `profile` reverse relations

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use shelfctl_core::models::{
    Author, AuthorInput, AuthorProfile, Paginated, Pagination, PaginationParams, Post,
};

use crate::db::AuthorDeletion;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, RecordId};
use crate::http::server::AppState;

/// GET /authors
async fn list_authors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<Author>>, ApiError> {
    let page = Pagination::from(params);
    Ok(Json(state.store.list_authors(page).await?))
}

/// POST /authors
async fn create_author(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<AuthorInput>,
) -> Result<(StatusCode, Json<Author>), ApiError> {
    let author = state.store.create_author(input.validate()?).await?;
    tracing::info!(id = author.id, username = %author.username, "author created");

    Ok((StatusCode::CREATED, Json(author)))
}

/// GET /authors/{id}
async fn get_author(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<Json<Author>, ApiError> {
    Ok(Json(state.store.get_author(id).await?))
}

/// PUT /authors/{id}
async fn update_author(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    JsonBody(input): JsonBody<AuthorInput>,
) -> Result<Json<Author>, ApiError> {
    Ok(Json(state.store.update_author(id, input.validate()?).await?))
}

/// DELETE /authors/{id} - reports detached posts and the removed profile
async fn delete_author(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<Json<AuthorDeletion>, ApiError> {
    let deletion = state.store.delete_author(id).await?;
    tracing::info!(
        id,
        posts_detached = deletion.posts_detached,
        profile_deleted = deletion.profile_deleted,
        "author deleted"
    );
    Ok(Json(deletion))
}

/// GET /authors/{id}/posts
async fn author_posts(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<Post>>, ApiError> {
    let page = Pagination::from(params);
    Ok(Json(state.store.posts_by_author(id, page).await?))
}

/// GET /authors/{id}/profile
async fn author_profile(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<Json<AuthorProfile>, ApiError> {
    Ok(Json(state.store.profile_for_author(id).await?))
}

/// Author routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/authors", get(list_authors).post(create_author))
        .route(
            "/authors/{id}",
            get(get_author).put(update_author).delete(delete_author),
        )
        .route("/authors/{id}/posts", get(author_posts))
        .route("/authors/{id}/profile", get(author_profile))
}
