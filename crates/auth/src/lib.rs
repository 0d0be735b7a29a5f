//! JWT authentication for Storefront services
//!
//! Provides the token service that issues and validates access/refresh
//! token pairs, the configuration that builds it, and axum extractors that
//! authenticate bearer tokens for any state implementing `FromRef<S>` for
//! `TokenService`.

mod claims;
mod config;
mod error;
mod extractors;
mod jwt;
mod service;

pub use claims::Claims;
pub use config::{TokenConfig, DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_REFRESH_TOKEN_TTL_SECS};
pub use error::{AuthError, TokenError};
pub use extractors::{AdminUser, AuthUser, ADMIN_ROLE};
pub use jwt::extract_bearer_token;
pub use service::{TokenKind, TokenPair, TokenService};
