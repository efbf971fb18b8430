// src/handlers/webhook.rs
//! Stripe webhook: the only writer of subscription state. Verifies the
//! event signature before trusting anything in the payload.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::post,
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::generate::ErrorResponse;
use crate::stripe_client::{verify_signature, SignatureError, StripeEvent};
use crate::{services, AppState};

pub fn webhook_routes() -> Router {
    Router::new().route("/api/webhooks/stripe", post(stripe_webhook))
}

/// POST /api/webhooks/stripe - Signed event ingestion
async fn stripe_webhook(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, (StatusCode, Json<ErrorResponse>)> {
    let secret = state.stripe_webhook_secret.as_deref().ok_or_else(|| {
        tracing::error!("Stripe webhook hit but STRIPE_WEBHOOK_SECRET is not set");
        reject(
            StatusCode::BAD_REQUEST,
            "Webhook signature verification failed",
        )
    })?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            reject(
                StatusCode::BAD_REQUEST,
                &SignatureError::MissingHeader.to_string(),
            )
        })?;

    verify_signature(secret, signature, &body, Utc::now().timestamp()).map_err(|e| {
        tracing::warn!("Webhook signature rejected: {}", e);
        reject(StatusCode::BAD_REQUEST, &format!("Webhook Error: {e}"))
    })?;

    let event: StripeEvent = serde_json::from_str(&body).map_err(|e| {
        tracing::warn!("Webhook payload failed to parse: {}", e);
        reject(StatusCode::BAD_REQUEST, "Invalid event payload")
    })?;

    match event.event_type.as_str() {
        "customer.subscription.created" | "customer.subscription.updated" => {
            let subscription = event.subscription().map_err(|e| {
                tracing::warn!("Subscription object failed to parse: {}", e);
                reject(StatusCode::BAD_REQUEST, "Invalid event payload")
            })?;
            let end_date = subscription
                .current_period_end
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

            tracing::info!(
                subscription_id = %subscription.id,
                customer = %subscription.customer,
                status = %subscription.status,
                "mirroring subscription update"
            );

            if let Some(pool) = &state.db_pool {
                let rows = services::entitlement::apply_subscription_update(
                    pool,
                    &subscription.customer,
                    &subscription.status,
                    end_date,
                )
                .await
                .map_err(internal_error)?;
                if rows == 0 {
                    tracing::warn!(
                        customer = %subscription.customer,
                        "no profile references this customer yet"
                    );
                }
            } else {
                tracing::warn!("Profile store not configured; subscription update dropped");
            }
        }
        "customer.subscription.deleted" => {
            let subscription = event.subscription().map_err(|e| {
                tracing::warn!("Subscription object failed to parse: {}", e);
                reject(StatusCode::BAD_REQUEST, "Invalid event payload")
            })?;
            tracing::info!(
                subscription_id = %subscription.id,
                customer = %subscription.customer,
                "marking subscription canceled"
            );

            if let Some(pool) = &state.db_pool {
                services::entitlement::mark_subscription_canceled(pool, &subscription.customer)
                    .await
                    .map_err(internal_error)?;
            } else {
                tracing::warn!("Profile store not configured; cancellation dropped");
            }
        }
        other => {
            tracing::debug!(event_type = other, "ignoring unhandled event type");
        }
    }

    Ok(Json(json!({ "received": true })))
}

fn internal_error(e: sqlx::Error) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!("Profile update failed: {}", e);
    reject(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckoutConfig, Limits, ProviderCredentials};
    use crate::results::ResultStore;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    const SECRET: &str = "whsec_test_secret";

    fn test_state(webhook_secret: Option<&str>) -> Arc<AppState> {
        Arc::new(AppState {
            db_pool: None,
            providers: ProviderCredentials::default(),
            limits: Limits::default(),
            stripe_client: None,
            stripe_webhook_secret: webhook_secret.map(|s| s.to_string()),
            checkout: CheckoutConfig {
                price_id: None,
                success_url: String::new(),
                cancel_url: String::new(),
            },
            results: ResultStore::new(),
        })
    }

    fn signed_header(secret: &str, body: &str) -> String {
        let timestamp = Utc::now().timestamp();
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{body}").as_bytes());
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn event_body(event_type: &str) -> String {
        serde_json::to_string(&json!({
            "type": event_type,
            "data": {
                "object": {
                    "id": "sub_1",
                    "customer": "cus_1",
                    "status": "active",
                    "current_period_end": 1735689600
                }
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_signature_header_is_rejected() {
        let state = test_state(Some(SECRET));
        let result = stripe_webhook(
            Extension(state),
            HeaderMap::new(),
            event_body("customer.subscription.updated"),
        )
        .await;
        let (status, _) = result.err().expect("expected rejection");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_signature_is_rejected() {
        let state = test_state(Some(SECRET));
        let body = event_body("customer.subscription.updated");
        let mut headers = HeaderMap::new();
        headers.insert(
            "stripe-signature",
            signed_header("whsec_wrong", &body).parse().unwrap(),
        );

        let result = stripe_webhook(Extension(state), headers, body).await;
        let (status, response) = result.err().expect("expected rejection");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response.message.starts_with("Webhook Error"));
    }

    #[tokio::test]
    async fn test_missing_secret_is_rejected() {
        let state = test_state(None);
        let body = event_body("customer.subscription.updated");
        let mut headers = HeaderMap::new();
        headers.insert(
            "stripe-signature",
            signed_header(SECRET, &body).parse().unwrap(),
        );

        let result = stripe_webhook(Extension(state), headers, body).await;
        let (status, _) = result.err().expect("expected rejection");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unhandled_event_type_is_acknowledged() {
        let state = test_state(Some(SECRET));
        // Foreign object shape: only subscription events are inspected.
        let body = serde_json::to_string(&json!({
            "type": "invoice.paid",
            "data": { "object": { "id": "in_1", "amount_paid": 999 } }
        }))
        .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            "stripe-signature",
            signed_header(SECRET, &body).parse().unwrap(),
        );

        let Json(response) = stripe_webhook(Extension(state), headers, body)
            .await
            .expect("unhandled events are acknowledged");
        assert_eq!(response, json!({ "received": true }));
    }
}
