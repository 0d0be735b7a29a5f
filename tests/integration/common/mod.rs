//! Common test utilities and fixtures for integration tests
//!
//! This module provides shared infrastructure for all integration tests:
//! - Test configuration loaded from the environment
//! - A gateway-style router exercising login, refresh and protected routes
//! - A recording metrics sink
//! - Request helpers

use std::env;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{FromRef, State},
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use storefront_auth::{AdminUser, AuthError, AuthUser, TokenConfig, TokenService};
use storefront_common::{
    metrics::track_requests, trace::propagate_trace_id, MetricsRecorder, RequestMetrics,
    RequestObservation, TraceId,
};
use tower::ServiceExt;

static INIT: Once = Once::new();

/// Test environment configuration
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub jwt_secret: String,
}

impl TestConfig {
    pub fn from_env() -> Self {
        INIT.call_once(|| {
            dotenvy::from_filename(".env.test").ok();
        });

        Self {
            jwt_secret: env::var("TEST_JWT_SECRET")
                .unwrap_or_else(|_| "test_secret_key_for_testing_only".to_string()),
        }
    }
}

/// Metrics sink that keeps every observation
#[derive(Default)]
pub struct RecordingRecorder {
    pub observations: Mutex<Vec<RequestObservation>>,
}

impl MetricsRecorder for RecordingRecorder {
    fn record_request(&self, observation: &RequestObservation) {
        self.observations.lock().unwrap().push(observation.clone());
    }
}

/// Router state
#[derive(Clone)]
pub struct GatewayState {
    pub tokens: TokenService,
}

impl FromRef<GatewayState> for TokenService {
    fn from_ref(state: &GatewayState) -> Self {
        state.tokens.clone()
    }
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    user_id: String,
    email: String,
    role: String,
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

/// Issue a pair for the posted identity (stands in for a credential check)
async fn login(
    State(state): State<GatewayState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AuthError> {
    let pair = state
        .tokens
        .issue_token_pair(&request.user_id, &request.email, &request.role)?;

    Ok(Json(json!({
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
    })))
}

/// Exchange a refresh token for a fresh pair
async fn refresh(
    State(state): State<GatewayState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<Value>, AuthError> {
    let claims = state.tokens.validate_token(&request.refresh_token)?;
    let pair = state
        .tokens
        .issue_token_pair(&claims.user_id, &claims.email, &claims.role)?;

    Ok(Json(json!({
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
    })))
}

async fn me(AuthUser(claims): AuthUser, trace_id: TraceId) -> Json<Value> {
    Json(json!({
        "user_id": claims.user_id,
        "email": claims.email,
        "role": claims.role,
        "trace_id": trace_id.to_string(),
    }))
}

async fn admin_dashboard(AdminUser(claims): AdminUser) -> Json<Value> {
    Json(json!({ "admin": claims.user_id }))
}

/// Name the user of an expired session without authenticating them
async fn session_owner(
    State(state): State<GatewayState>,
    Json(request): Json<RefreshRequest>,
) -> Response {
    match state.tokens.claims_from_token(&request.refresh_token) {
        Ok(claims) => Json(json!({ "email": claims.email })).into_response(),
        Err(error) => AuthError::from(error).into_response(),
    }
}

/// Test application: router plus the handles tests inspect
pub struct TestApp {
    pub router: Router,
    pub tokens: TokenService,
    pub recorder: Arc<RecordingRecorder>,
    pub config: TestConfig,
}

impl TestApp {
    pub fn new() -> Self {
        let config = TestConfig::from_env();
        Self::with_tokens(config.clone(), TokenConfig::new(config.jwt_secret).service())
    }

    /// App whose tokens expire almost immediately
    pub fn short_lived() -> Self {
        let config = TestConfig::from_env();
        let tokens = TokenService::new(
            &config.jwt_secret,
            Duration::from_millis(1),
            Duration::from_millis(1),
        );
        Self::with_tokens(config, tokens)
    }

    fn with_tokens(config: TestConfig, tokens: TokenService) -> Self {
        let recorder = Arc::new(RecordingRecorder::default());
        let metrics = RequestMetrics::new("gateway", recorder.clone());

        let state = GatewayState {
            tokens: tokens.clone(),
        };

        let router = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/refresh", post(refresh))
            .route("/auth/session-owner", post(session_owner))
            .route("/me", get(me))
            .route("/admin", get(admin_dashboard))
            .route_layer(middleware::from_fn_with_state(metrics, track_requests))
            .layer(middleware::from_fn(propagate_trace_id))
            .with_state(state);

        Self {
            router,
            tokens,
            recorder,
            config,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, bearer: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Log in and return `(access_token, refresh_token)`
    pub async fn login(&self, user_id: &str, email: &str, role: &str) -> (String, String) {
        let response = self
            .post_json(
                "/auth/login",
                json!({ "user_id": user_id, "email": email, "role": role }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the standard `{"error":{"code":...}}` body
pub async fn assert_error_code(response: Response, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], code);
}
