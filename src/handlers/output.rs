// src/handlers/output.rs
use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::models::generate::ErrorResponse;
use crate::AppState;

pub const DOWNLOAD_FILENAME: &str = "generated-prompts.txt";

#[derive(Serialize)]
pub struct OutputResponse {
    pub success: bool,
    pub processed_text: String,
}

pub fn output_routes() -> Router {
    Router::new()
        .route("/api/output", get(get_output))
        .route("/api/output/download", get(download_output))
}

/// GET /api/output - Current processed result as JSON
async fn get_output(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<OutputResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.results.current() {
        Some(processed_text) => Ok(Json(OutputResponse {
            success: true,
            processed_text,
        })),
        None => Err(not_generated_yet()),
    }
}

/// GET /api/output/download - Current processed result as a plain-text
/// attachment. Repeated calls with an unchanged result return identical
/// bytes.
async fn download_output(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let text = state.results.current().ok_or_else(not_generated_yet)?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
        )
        .body(axum::body::Body::from(text))
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    message: "Failed to build download response".to_string(),
                }),
            )
        })
}

fn not_generated_yet() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            message: "No generated prompts available yet".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckoutConfig, Limits, ProviderCredentials};
    use crate::results::ResultStore;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            db_pool: None,
            providers: ProviderCredentials::default(),
            limits: Limits::default(),
            stripe_client: None,
            stripe_webhook_secret: None,
            checkout: CheckoutConfig {
                price_id: None,
                success_url: String::new(),
                cancel_url: String::new(),
            },
            results: ResultStore::new(),
        })
    }

    #[tokio::test]
    async fn test_download_before_any_generation_is_404() {
        let state = test_state();
        let result = download_output(Extension(state)).await;
        let (status, _) = result.err().expect("expected 404");
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_is_byte_identical_while_result_is_unchanged() {
        let state = test_state();
        let id = state.results.begin();
        state.results.commit(id, "block one\n\nblock two".to_string());

        let mut downloads = Vec::new();
        for _ in 0..2 {
            let response = download_output(Extension(state.clone()))
                .await
                .expect("download should succeed")
                .into_response();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response
                    .headers()
                    .get(header::CONTENT_DISPOSITION)
                    .and_then(|v| v.to_str().ok()),
                Some("attachment; filename=\"generated-prompts.txt\"")
            );
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            downloads.push(bytes);
        }

        assert_eq!(downloads[0], downloads[1]);
        assert_eq!(&downloads[0][..], b"block one\n\nblock two");
    }
}
