use serde::{Deserialize, Serialize};

use crate::processor::ProviderId;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    pub images_per_minute: u32,
    pub provider: ProviderId,
    /// Identifies the session user for entitlement gating. Optional:
    /// without it (or without a profile store) gating is skipped.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub processed_text: String,
    pub word_count: usize,
    pub estimated_minutes: u32,
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderId>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}
