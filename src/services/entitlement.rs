// Profile store reads and webhook-driven writes. The service never
// mutates subscription state on its own; only the Stripe webhook does.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::profile::{Profile, SubscriptionStatus};

pub async fn fetch_profile(pool: &PgPool, user_id: &str) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        "SELECT user_id, stripe_customer_id, subscription_status, subscription_end_date, country
         FROM profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Subscription standing for gating. A missing row or an unknown status
/// string both read as "no subscription".
pub async fn subscription_status(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<SubscriptionStatus>, sqlx::Error> {
    let profile = fetch_profile(pool, user_id).await?;
    Ok(profile.and_then(|p| SubscriptionStatus::parse(&p.subscription_status)))
}

/// Mirrors a subscription created/updated event onto the profile row
/// keyed by the processor's customer id. Returns the number of rows
/// touched; zero means no profile references that customer yet.
pub async fn apply_subscription_update(
    pool: &PgPool,
    stripe_customer_id: &str,
    status: &str,
    end_date: Option<DateTime<Utc>>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE profiles
         SET subscription_status = $1, subscription_end_date = $2, updated_at = NOW()
         WHERE stripe_customer_id = $3",
    )
    .bind(status)
    .bind(end_date)
    .bind(stripe_customer_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn mark_subscription_canceled(
    pool: &PgPool,
    stripe_customer_id: &str,
) -> Result<u64, sqlx::Error> {
    apply_subscription_update(
        pool,
        stripe_customer_id,
        SubscriptionStatus::Canceled.as_str(),
        Some(Utc::now()),
    )
    .await
}
