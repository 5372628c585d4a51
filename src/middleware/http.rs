//! Outer HTTP layers shared by every route, including `/health`.
//!
//! - `x-request-id`: generated when missing, echoed on the response
//! - tracing span per request, keyed by request id
//! - body limit and whole-request timeout, both from `Config`
//!
//! Spans record the path only. `access_token` travels in the query string and
//! must not end up in access logs.
//!
//! The introspection call has its own, shorter timeout (`OAUTH_TIMEOUT_MS`);
//! `REQUEST_TIMEOUT_MS` bounds the whole request, middleware included.

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{Request, StatusCode, header::HeaderName};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{MakeSpan, TraceLayer};
use tracing::Span;

use crate::config::Config;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Limits for the outer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl From<&Config> for HttpLimits {
    fn from(config: &Config) -> Self {
        Self {
            request_timeout: config.request_timeout,
            body_limit_bytes: config.body_limit_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, req: &Request<B>) -> Span {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            request_id,
        )
    }
}

pub fn apply(router: Router, limits: HttpLimits) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                tracing::warn!("request timed out");
                StatusCode::REQUEST_TIMEOUT
            } else {
                tracing::error!(error = %err, "unhandled middleware error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        // Set before tracing so the span can carry it.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
        .layer(RequestBodyLimitLayer::new(limits.body_limit_bytes))
        .layer(TimeoutLayer::new(limits.request_timeout));

    router.layer(layers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_follow_config() {
        let config = Config::from_lookup(|key| match key {
            "REQUEST_TIMEOUT_MS" => Some("1500".to_string()),
            "BODY_LIMIT_BYTES" => Some("2048".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(
            HttpLimits::from(&config),
            HttpLimits {
                request_timeout: Duration::from_millis(1500),
                body_limit_bytes: 2048,
            }
        );
    }
}
