//! Trace id propagation
//!
//! A request's trace id is carried as a typed [`TraceId`] in the request
//! extensions. Handlers read it with the [`trace_id`] accessor or the
//! `TraceId` extractor; nothing looks it up by string key.

use std::convert::Infallible;
use std::fmt;

use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, Extensions, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header used to receive and echo trace ids
pub const TRACE_ID_HEADER: &str = "x-trace-id";

const MAX_TRACE_ID_LEN: usize = 128;

/// Correlation id for one inbound request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceId(String);

impl TraceId {
    /// Fresh random trace id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept a caller-supplied id if it is non-empty, visible ASCII and
    /// at most 128 characters.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty()
            || value.len() > MAX_TRACE_ID_LEN
            || !value.chars().all(|c| c.is_ascii_graphic())
        {
            return None;
        }
        Some(Self(value.to_string()))
    }

    /// Take the id from `x-trace-id`, or generate one
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(Self::parse)
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trace id stored on a request by [`propagate_trace_id`], if any
pub fn trace_id(extensions: &Extensions) -> Option<&TraceId> {
    extensions.get::<TraceId>()
}

/// Middleware: resolve the trace id, store it in the request extensions,
/// run the rest of the stack inside a `request` span and echo the id back.
pub async fn propagate_trace_id(mut request: Request, next: Next) -> Response {
    let trace_id = TraceId::from_headers(request.headers());
    request.extensions_mut().insert(trace_id.clone());

    let span = tracing::info_span!(
        "request",
        trace_id = %trace_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }

    response
}

impl<S> FromRequestParts<S> for TraceId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        // Routes mounted without the middleware still get a usable id
        Ok(trace_id(&parts.extensions)
            .cloned()
            .unwrap_or_else(|| TraceId::from_headers(&parts.headers)))
    }
}
