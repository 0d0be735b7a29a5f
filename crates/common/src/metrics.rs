//! Request metrics through an injected recorder
//!
//! Services hand a [`MetricsRecorder`] to the middleware that needs it instead
//! of writing to process-global counters. Exporters (Prometheus or otherwise)
//! implement the trait at the composition root.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

/// One completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestObservation {
    pub service: String,
    pub method: String,
    /// Matched route template when available, raw path otherwise
    pub route: String,
    pub status: u16,
    pub elapsed: Duration,
}

/// Sink for request observations
pub trait MetricsRecorder: Send + Sync {
    fn record_request(&self, observation: &RequestObservation);
}

/// Recorder that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl MetricsRecorder for NoopRecorder {
    #[mutants::skip] // Nothing to observe
    fn record_request(&self, _observation: &RequestObservation) {}
}

/// Middleware state: the service label plus its recorder
#[derive(Clone)]
pub struct RequestMetrics {
    service: Arc<str>,
    recorder: Arc<dyn MetricsRecorder>,
}

impl RequestMetrics {
    pub fn new(service: impl Into<String>, recorder: Arc<dyn MetricsRecorder>) -> Self {
        Self {
            service: Arc::from(service.into()),
            recorder,
        }
    }

    pub fn noop(service: impl Into<String>) -> Self {
        Self::new(service, Arc::new(NoopRecorder))
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl fmt::Debug for RequestMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestMetrics")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

/// Middleware: time the request and report one observation per response.
///
/// Mount with `axum::middleware::from_fn_with_state`. Route templates are
/// only known when mounted through `Router::route_layer`.
pub async fn track_requests(
    State(metrics): State<RequestMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let started = Instant::now();
    let response = next.run(request).await;

    let observation = RequestObservation {
        service: metrics.service().to_string(),
        method,
        route,
        status: response.status().as_u16(),
        elapsed: started.elapsed(),
    };
    metrics.recorder.record_request(&observation);

    response
}
