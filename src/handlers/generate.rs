// src/handlers/generate.rs
//! Prompt generation endpoint and the gating in front of it.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::models::generate::{
    ErrorResponse, GenerateRequest, GenerateResponse, ProvidersResponse,
};
use crate::{processor, script, services, AppState};

pub fn generate_routes() -> Router {
    Router::new()
        .route("/api/generate", post(generate_prompts))
        .route("/api/providers", get(list_providers))
}

/// GET /api/providers - Providers with a configured credential
async fn list_providers(Extension(state): Extension<Arc<AppState>>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state.providers.enabled(),
    })
}

/// POST /api/generate - Validate, gate, call the selected provider,
/// commit the result
async fn generate_prompts(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let words = script::word_count(&request.text);

    if words == 0 {
        return Err(reject(StatusCode::BAD_REQUEST, "Script text is empty"));
    }
    if request.images_per_minute < 1
        || request.images_per_minute > state.limits.max_images_per_minute
    {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            &format!(
                "Images per minute must be between 1 and {}",
                state.limits.max_images_per_minute
            ),
        ));
    }
    if words > state.limits.word_limit {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            &format!(
                "Script exceeds the {}-word limit ({} words)",
                state.limits.word_limit, words
            ),
        ));
    }

    let api_key = state.providers.key_for(request.provider).ok_or_else(|| {
        reject(
            StatusCode::BAD_REQUEST,
            &format!("Provider '{}' is not configured", request.provider.as_str()),
        )
    })?;

    // Entitlement gating: without an active subscription the free-tier
    // ceiling applies. Skipped entirely when no profile store or no user
    // id is present (the single-tier configuration).
    if let (Some(pool), Some(user_id)) = (&state.db_pool, request.user_id.as_deref()) {
        let status = services::entitlement::subscription_status(pool, user_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to read entitlement for {}: {}", user_id, e);
                reject(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to read subscription status",
                )
            })?;

        let active = status.map(|s| s.is_active()).unwrap_or(false);
        if !active && words > state.limits.free_tier_word_limit {
            return Err(reject(
                StatusCode::PAYMENT_REQUIRED,
                &format!(
                    "Scripts over {} words require an active subscription. Subscribe to unlock the {}-word limit.",
                    state.limits.free_tier_word_limit, state.limits.word_limit
                ),
            ));
        }
    }

    let estimated_minutes = script::estimated_minutes(&request.text);
    let request_id = state.results.begin();

    tracing::info!(
        request_id,
        provider = request.provider.as_str(),
        words,
        estimated_minutes,
        images_per_minute = request.images_per_minute,
        "processing script"
    );

    match processor::process(
        &request.text,
        request.images_per_minute,
        estimated_minutes,
        request.provider,
        api_key,
    )
    .await
    {
        Ok(processed_text) => {
            if !state.results.commit(request_id, processed_text.clone()) {
                tracing::debug!(request_id, "result superseded by a newer generation");
            }
            Ok(Json(GenerateResponse {
                success: true,
                processed_text,
                word_count: words,
                estimated_minutes,
            }))
        }
        Err(e) => {
            tracing::error!(
                request_id,
                provider = request.provider.as_str(),
                "provider call failed: {}",
                e
            );
            Err(reject(StatusCode::BAD_GATEWAY, &e.to_string()))
        }
    }
}

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.to_string(),
        }),
    )
}
