use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod anthropic_client;
mod config;
mod db;
mod gemini_client;
mod handlers;
mod middleware;
mod models;
mod openai_client;
mod processor;
mod results;
mod script;
mod services;
mod stripe_client;

// AppState holds the optional profile store pool, the provider credential
// table, limits, Stripe configuration, and the single-result store.
pub struct AppState {
    pub db_pool: Option<sqlx::PgPool>,
    pub providers: config::ProviderCredentials,
    pub limits: config::Limits,
    pub stripe_client: Option<stripe_client::StripeClient>,
    pub stripe_webhook_secret: Option<String>,
    pub checkout: config::CheckoutConfig,
    pub results: results::ResultStore,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    let providers = config::ProviderCredentials::from_env();
    for provider in processor::ProviderId::ALL {
        if providers.key_for(provider).is_some() {
            tracing::info!("Provider '{}' enabled", provider.as_str());
        } else {
            tracing::warn!(
                "Provider '{}' has no API key configured and will not be offered",
                provider.as_str()
            );
        }
    }

    let limits = config::Limits::from_env();
    tracing::info!(
        "Word limit: {} ({} free tier), max images per minute: {}",
        limits.word_limit,
        limits.free_tier_word_limit,
        limits.max_images_per_minute
    );

    // Profile store is optional: without it, entitlement gating is off and
    // webhook writes are dropped.
    let db_pool = match std::env::var("DATABASE_URL").ok() {
        Some(url) => match db::create_pool(&url).await {
            Ok(pool) => {
                tracing::info!("Profile store connected");
                Some(pool)
            }
            Err(e) => {
                tracing::error!("Failed to connect to profile store: {}", e);
                None
            }
        },
        None => {
            tracing::warn!("DATABASE_URL not found. Entitlement gating will be disabled.");
            None
        }
    };

    let stripe_client = match std::env::var("STRIPE_SECRET_KEY").ok() {
        Some(secret_key) if !secret_key.is_empty() => {
            tracing::info!("Initializing Stripe client...");
            Some(stripe_client::StripeClient::new(secret_key))
        }
        _ => {
            tracing::warn!("STRIPE_SECRET_KEY not found. Checkout will be disabled.");
            None
        }
    };

    let stripe_webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET").ok();
    if stripe_webhook_secret.is_none() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not found. Webhook events will be rejected.");
    }

    let shared_state = Arc::new(AppState {
        db_pool,
        providers,
        limits,
        stripe_client,
        stripe_webhook_secret,
        checkout: config::CheckoutConfig::from_env(),
        results: results::ResultStore::new(),
    });

    // Build our application with all routes and shared state
    let app = Router::new()
        .merge(handlers::ui::ui_routes())
        .merge(handlers::generate::generate_routes())
        .merge(handlers::output::output_routes())
        .merge(handlers::entitlement::entitlement_routes())
        .merge(handlers::webhook::webhook_routes())
        .route("/api/status", axum::routing::get(api_status))
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(Extension(shared_state.clone()));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .unwrap();
}

// Production-grade logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,promptcut=trace,sqlx=info,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,promptcut=info,sqlx=warn,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    // JSON logging for production, human-readable for development
    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("PromptCut starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Build mode: {}",
        if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        }
    );

    Ok(())
}

// API Status endpoint
async fn api_status(
    Extension(state): Extension<Arc<AppState>>,
) -> axum::response::Json<serde_json::Value> {
    use serde_json::json;

    let providers: Vec<&str> = state
        .providers
        .enabled()
        .into_iter()
        .map(|p| p.as_str())
        .collect();

    axum::response::Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": providers,
        "features": {
            "entitlement_gating": state.db_pool.is_some(),
            "checkout": state.stripe_client.is_some() && state.checkout.price_id.is_some(),
            "stripe_webhook": state.stripe_webhook_secret.is_some(),
            "word_limit": state.limits.word_limit,
            "free_tier_word_limit": state.limits.free_tier_word_limit,
        },
        "endpoints": {
            "status": "/api/status",
            "providers": "/api/providers",
            "generate": "/api/generate",
            "output": "/api/output",
            "download": "/api/output/download",
            "entitlement": "/api/entitlement/:user_id",
            "checkout": "/api/checkout",
            "stripe_webhook": "/api/webhooks/stripe"
        }
    }))
}
