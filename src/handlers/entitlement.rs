// src/handlers/entitlement.rs
//! Read-only entitlement view plus checkout session creation. The
//! webhook is the only writer of subscription state.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::models::generate::{CheckoutRequest, CheckoutResponse, ErrorResponse};
use crate::models::profile::EntitlementResponse;
use crate::{services, AppState};

pub fn entitlement_routes() -> Router {
    Router::new()
        .route("/api/entitlement/:user_id", get(get_entitlement))
        .route("/api/checkout", post(create_checkout))
}

/// GET /api/entitlement/:user_id - Subscription status and country for
/// the session user
async fn get_entitlement(
    Path(user_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<EntitlementResponse>, (StatusCode, Json<ErrorResponse>)> {
    let pool = state.db_pool.as_ref().ok_or_else(|| {
        reject(
            StatusCode::SERVICE_UNAVAILABLE,
            "Profile store is not configured",
        )
    })?;

    let profile = services::entitlement::fetch_profile(pool, &user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch profile for {}: {}", user_id, e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch profile")
        })?;

    match profile {
        Some(profile) => Ok(Json(EntitlementResponse {
            subscription_status: profile.subscription_status,
            country: profile.country,
        })),
        None => Err(reject(StatusCode::NOT_FOUND, "Profile not found")),
    }
}

/// POST /api/checkout - Create a subscription checkout session and
/// return its redirect URL
async fn create_checkout(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (stripe_client, price_id) = match (&state.stripe_client, &state.checkout.price_id) {
        (Some(client), Some(price_id)) => (client, price_id),
        _ => {
            return Err(reject(
                StatusCode::SERVICE_UNAVAILABLE,
                "Checkout is not configured",
            ));
        }
    };

    let url = stripe_client
        .create_checkout_session(
            price_id,
            &request.user_id,
            &state.checkout.success_url,
            &state.checkout.cancel_url,
        )
        .await
        .map_err(|e| {
            tracing::error!("Checkout session creation failed: {}", e);
            reject(StatusCode::BAD_GATEWAY, &e.to_string())
        })?;

    Ok(Json(CheckoutResponse { url }))
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
