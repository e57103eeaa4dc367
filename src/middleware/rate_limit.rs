use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{Response as HttpResponse, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorError, GovernorLayer};

/// Type alias for IP-based governor layers
pub type IpGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

fn ip_governor(per_ms: u64, burst: u32) -> IpGovernorLayer {
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(burst)
            .finish()
            .expect("valid IP rate limit config"),
    );

    GovernorLayer::new(config).error_handler(rate_limit_error_handler)
}

/// Global limiter, applied before authentication:
/// 1000 requests per minute per IP (one token every 60ms)
pub fn create_global_governor() -> IpGovernorLayer {
    ip_governor(60, 1000)
}

/// Public catalog and auth routes: 100 requests per minute per IP
pub fn create_public_governor() -> IpGovernorLayer {
    ip_governor(600, 100)
}

#[derive(serde::Serialize)]
struct RateLimitBody {
    message: String,
}

/// JSON body for limiter rejections, matching `AppError` responses
pub fn rate_limit_error_handler(err: GovernorError) -> HttpResponse<Body> {
    let (status, message) = match err {
        GovernorError::TooManyRequests { wait_time, .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            format!("Too many requests, retry in {} seconds", wait_time),
        ),
        GovernorError::UnableToExtractKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unable to identify client".to_string(),
        ),
        GovernorError::Other { code, msg, .. } => {
            (code, msg.unwrap_or_else(|| "Request rejected".to_string()))
        }
    };

    (status, Json(RateLimitBody { message })).into_response()
}

/// Middleware to log request outcomes, rate limiting included
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!(
        client_ip = %addr.ip(),
        method = %method,
        uri = %uri,
        "Incoming request"
    );

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            "Rate limited"
        );
    } else if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request failed"
        );
    } else {
        tracing::debug!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request completed"
        );
    }

    response
}
