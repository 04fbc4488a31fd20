//! Admin registry endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::admin::ModelAdmin;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Entry in the model index
#[derive(Serialize)]
pub struct ModelSummary {
    pub app_label: &'static str,
    pub model_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub api_path: &'static str,
}

impl From<&ModelAdmin> for ModelSummary {
    fn from(m: &ModelAdmin) -> Self {
        Self {
            app_label: m.app_label,
            model_name: m.model_name,
            verbose_name_plural: m.verbose_name_plural,
            api_path: m.api_path,
        }
    }
}

/// GET /admin - registered models
async fn list_models(State(state): State<Arc<AppState>>) -> Json<Vec<ModelSummary>> {
    Json(state.admin.models().iter().map(ModelSummary::from).collect())
}

/// GET /admin/{model} - full descriptor
async fn get_model(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
) -> Result<Json<ModelAdmin>, ApiError> {
    state
        .admin
        .get(&model)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound {
            resource: "model",
            id: model,
        })
}

/// Admin routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(list_models))
        .route("/admin/{model}", get(get_model))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::http::routes::test_support::{app, send};

    #[tokio::test]
    async fn lists_registered_models() {
        let (app, _dir) = app();
        let (status, body) = send(&app, Method::GET, "/admin", None).await;
        assert_eq!(status, StatusCode::OK);

        let paths: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["api_path"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(paths, ["/books", "/authors", "/author-profiles", "/posts"]);
    }

    #[tokio::test]
    async fn model_descriptor() {
        let (app, _dir) = app();
        let (status, body) = send(&app, Method::GET, "/admin/book", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["table"], "my_app_book");
        assert_eq!(body["fields"][1]["label"], "Book title");

        let (status, _) = send(&app, Method::GET, "/admin/unicorn", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
