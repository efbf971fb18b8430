use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Subscription standing mirrored from the payment processor. The set of
/// values matches Stripe's subscription statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    Canceled,
    Incomplete,
    IncompleteExpired,
    PastDue,
    Unpaid,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Unpaid => "unpaid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(SubscriptionStatus::Active),
            "trialing" => Some(SubscriptionStatus::Trialing),
            "canceled" => Some(SubscriptionStatus::Canceled),
            "incomplete" => Some(SubscriptionStatus::Incomplete),
            "incomplete_expired" => Some(SubscriptionStatus::IncompleteExpired),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "unpaid" => Some(SubscriptionStatus::Unpaid),
            _ => None,
        }
    }

    /// Only an active subscription unlocks the full word limit.
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

#[derive(Debug, FromRow)]
pub struct Profile {
    pub user_id: String,
    pub stripe_customer_id: Option<String>,
    pub subscription_status: String,
    pub subscription_end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntitlementResponse {
    pub subscription_status: String,
    pub country: Option<String>,
}
