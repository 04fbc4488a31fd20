//! Book endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use shelfctl_core::models::{Book, BookInput, Paginated, Pagination, PaginationParams};

use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, RecordId};
use crate::http::server::AppState;

/// GET /books - list books, newest first
async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<Book>>, ApiError> {
    let page = Pagination::from(params);
    Ok(Json(state.store.list_books(page).await?))
}

/// POST /books - create a book
async fn create_book(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<BookInput>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let book = input.validate()?;
    let book = state.store.create_book(book).await?;
    tracing::info!(id = book.id, title = %book.title, "book created");

    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /books/{id}
async fn get_book(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.store.get_book(id).await?))
}

/// PUT /books/{id} - replace all editable fields
async fn update_book(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    JsonBody(input): JsonBody<BookInput>,
) -> Result<Json<Book>, ApiError> {
    let book = input.validate()?;
    Ok(Json(state.store.update_book(id, book).await?))
}

/// DELETE /books/{id}
async fn delete_book(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<StatusCode, ApiError> {
    state.store.delete_book(id).await?;
    tracing::info!(id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Book routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::http::routes::test_support::{app, send};

    fn book(title: &str) -> serde_json::Value {
        json!({
            "title": title,
            "description": "A description of at least twenty characters",
            "published_date": "1954-07-29T00:00:00Z",
            "price": "19.99",
        })
    }

    #[tokio::test]
    async fn create_defaults_category() {
        let (app, _dir) = app();
        let (status, body) = send(&app, Method::POST, "/books", Some(book("Dune"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 1);
        assert_eq!(body["category"], "N/A");
        assert!(body["comment"].is_null());
    }

    #[tokio::test]
    async fn blank_title_uses_custom_message() {
        let (app, _dir) = app();
        let (status, body) = send(&app, Method::POST, "/books", Some(book("   "))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Sorry, a book cannot be created without a title."
        );
    }

    #[tokio::test]
    async fn duplicate_title_conflicts() {
        let (app, _dir) = app();
        send(&app, Method::POST, "/books", Some(book("Emma"))).await;
        let (status, body) = send(&app, Method::POST, "/books", Some(book("Emma"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["field"], "title");
        assert_eq!(
            body["message"],
            "It looks like a book with this title already exists."
        );
    }

    #[tokio::test]
    async fn rejects_price_precision_and_bad_category() {
        let (app, _dir) = app();

        let mut input = book("Precise");
        input["price"] = json!("1234.50");
        let (status, body) = send(&app, Method::POST, "/books", Some(input)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "price");

        let mut input = book("Categorised");
        input["category"] = json!("fantasy");
        let (status, body) = send(&app, Method::POST, "/books", Some(input)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "category");
    }

    #[tokio::test]
    async fn update_get_delete() {
        let (app, _dir) = app();
        send(&app, Method::POST, "/books", Some(book("Draft"))).await;

        let mut input = book("Final");
        input["category"] = json!("Biography");
        let (status, body) = send(&app, Method::PUT, "/books/1", Some(input)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Final");

        let (_, body) = send(&app, Method::GET, "/books/1", None).await;
        assert_eq!(body["category"], "Biography");

        let (status, _) = send(&app, Method::DELETE, "/books/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, "/books/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_requests() {
        let (app, _dir) = app();
        let (status, _) = send(&app, Method::GET, "/books/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::POST, "/books", Some(json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn list_paginates() {
        let (app, _dir) = app();
        for title in ["A", "B", "C"] {
            send(&app, Method::POST, "/books", Some(book(title))).await;
        }

        let (status, body) = send(&app, Method::GET, "/books?page=1&per_page=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["items"][0]["title"], "C");
    }
}
