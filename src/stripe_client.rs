// Stripe integration: webhook signature verification plus checkout
// session creation. Events mutate subscription state; this service only
// ever reads it back.

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signed event, in seconds. Matches Stripe's
/// recommended replay tolerance.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing stripe-signature header")]
    MissingHeader,
    #[error("malformed stripe-signature header")]
    Malformed,
    #[error("signature timestamp outside tolerance")]
    TimestampOutOfTolerance,
    #[error("signature does not match payload")]
    NoMatch,
}

/// Verifies a `stripe-signature` header (`t=<unix>,v1=<hex>,...`) against
/// the raw request body. The signed payload is `{t}.{body}` and any one
/// matching v1 entry is accepted.
pub fn verify_signature(
    secret: &str,
    header: &str,
    payload: &str,
    now_unix: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => {
                if let Ok(bytes) = hex::decode(value) {
                    candidates.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if candidates.is_empty() {
        return Err(SignatureError::Malformed);
    }
    if (now_unix - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    let signed_payload = format!("{timestamp}.{payload}");
    for candidate in &candidates {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SignatureError::Malformed)?;
        mac.update(signed_payload.as_bytes());
        if mac.verify_slice(candidate).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::NoMatch)
}

// Webhook event payload, reduced to the fields the entitlement mirror
// needs. `data.object` stays untyped until the event type is known:
// only subscription events carry a subscription-shaped object.

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

impl StripeEvent {
    pub fn subscription(&self) -> Result<StripeSubscription, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub customer: String,
    pub status: String,
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    url: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self::with_base_url(secret_key, "https://api.stripe.com".to_string())
    }

    pub fn with_base_url(secret_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            secret_key,
            base_url,
        }
    }

    /// Creates a subscription-mode checkout session and returns the
    /// hosted page URL the caller should redirect to.
    pub async fn create_checkout_session(
        &self,
        price_id: &str,
        client_reference_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);

        let params = [
            ("mode", "subscription"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("client_reference_id", client_reference_id),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("Stripe checkout API error ({status}): {error_text}").into());
        }

        let session: CheckoutSessionResponse = response.json().await?;
        Ok(session.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, timestamp: i64, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{payload}").as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("t={timestamp},v1={signature}")
    }

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &str = r#"{"type":"customer.subscription.updated"}"#;

    #[test]
    fn test_valid_signature_verifies() {
        let header = sign(SECRET, 1_700_000_000, PAYLOAD);
        assert_eq!(
            verify_signature(SECRET, &header, PAYLOAD, 1_700_000_000),
            Ok(())
        );
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let header = sign(SECRET, 1_700_000_000, PAYLOAD);
        let tampered = r#"{"type":"customer.subscription.deleted"}"#;
        assert_eq!(
            verify_signature(SECRET, &header, tampered, 1_700_000_000),
            Err(SignatureError::NoMatch)
        );
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let header = sign("whsec_other", 1_700_000_000, PAYLOAD);
        assert_eq!(
            verify_signature(SECRET, &header, PAYLOAD, 1_700_000_000),
            Err(SignatureError::NoMatch)
        );
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let header = sign(SECRET, 1_700_000_000, PAYLOAD);
        assert_eq!(
            verify_signature(
                SECRET,
                &header,
                PAYLOAD,
                1_700_000_000 + SIGNATURE_TOLERANCE_SECS + 1
            ),
            Err(SignatureError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn test_header_without_v1_entry_is_malformed() {
        assert_eq!(
            verify_signature(SECRET, "t=1700000000", PAYLOAD, 1_700_000_000),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(SECRET, "garbage", PAYLOAD, 1_700_000_000),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn test_any_matching_v1_entry_is_accepted() {
        // Header carries an old key's signature first, then a valid one
        // (key rotation shape).
        let valid = sign(SECRET, 1_700_000_000, PAYLOAD);
        let valid_sig = valid.split_once("v1=").unwrap().1.to_string();
        let header = format!("t=1700000000,v1={},v1={valid_sig}", "ab".repeat(32));
        assert_eq!(
            verify_signature(SECRET, &header, PAYLOAD, 1_700_000_000),
            Ok(())
        );
    }

    #[test]
    fn test_event_payload_parses() {
        let body = r#"{
            "id": "evt_1",
            "type": "customer.subscription.updated",
            "data": {
                "object": {
                    "id": "sub_123",
                    "customer": "cus_456",
                    "status": "active",
                    "current_period_end": 1735689600
                }
            }
        }"#;
        let event: StripeEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.event_type, "customer.subscription.updated");
        let subscription = event.subscription().unwrap();
        assert_eq!(subscription.customer, "cus_456");
        assert_eq!(subscription.status, "active");
        assert_eq!(subscription.current_period_end, Some(1735689600));
    }
}
