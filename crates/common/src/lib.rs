//! Shared infrastructure for Storefront services
//!
//! This crate provides the ambient plumbing every service binary wires up:
//! - Logging configuration loaded from the environment
//! - `tracing` subscriber setup (JSON or pretty output)
//! - Typed trace id propagation for axum requests
//! - Request metrics reported through an injected recorder

pub mod config;
pub mod logging;
pub mod metrics;
pub mod trace;

pub use config::{LogConfig, LogFormat};
pub use logging::init_tracing;
pub use metrics::{MetricsRecorder, NoopRecorder, RequestMetrics, RequestObservation};
pub use trace::{trace_id, TraceId, TRACE_ID_HEADER};
