use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

/// Structured request/response logging for every HTTP request.
pub async fn request_logging_middleware(req: Request, next: Next) -> Result<Response, StatusCode> {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let uri = req.uri().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_owned())
        .unwrap_or_else(|| "unknown".to_owned());
    let remote_addr = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %matched_path,
        uri = %uri,
        remote_addr = %remote_addr,
        "incoming request"
    );

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    match status.as_u16() {
        400..=499 => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %matched_path,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "request completed (client error)"
            );
        }
        500..=599 => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %matched_path,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "request completed (server error)"
            );
        }
        _ => {
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %matched_path,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "request completed"
            );
        }
    }

    Ok(response)
}
