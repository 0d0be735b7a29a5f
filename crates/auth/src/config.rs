//! Token configuration

use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::Result;

use crate::service::TokenService;

/// Default access token lifetime: 15 minutes
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 15 * 60;

/// Default refresh token lifetime: 7 days
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Secret and lifetimes for the token service
#[derive(Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

impl TokenConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl: Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: Duration::from_secs(DEFAULT_REFRESH_TOKEN_TTL_SECS),
        }
    }

    /// Load from `JWT_SECRET`, `ACCESS_TOKEN_TTL_SECS` and `REFRESH_TOKEN_TTL_SECS`
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is required"))?;
        if jwt_secret.trim().is_empty() {
            return Err(anyhow::anyhow!("JWT_SECRET must not be empty"));
        }

        Ok(Self {
            jwt_secret,
            access_token_ttl: ttl_from_env(
                "ACCESS_TOKEN_TTL_SECS",
                DEFAULT_ACCESS_TOKEN_TTL_SECS,
            )?,
            refresh_token_ttl: ttl_from_env(
                "REFRESH_TOKEN_TTL_SECS",
                DEFAULT_REFRESH_TOKEN_TTL_SECS,
            )?,
        })
    }

    /// Build the token service for this configuration
    pub fn service(&self) -> TokenService {
        TokenService::new(
            &self.jwt_secret,
            self.access_token_ttl,
            self.refresh_token_ttl,
        )
    }
}

impl fmt::Debug for TokenConfig {
    #[mutants::skip] // Formatting only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

fn ttl_from_env(name: &str, default_secs: u64) -> Result<Duration> {
    let secs = match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds", name))?,
        Err(_) => default_secs,
    };

    if secs == 0 {
        return Err(anyhow::anyhow!("{} must be greater than zero", name));
    }

    Ok(Duration::from_secs(secs))
}
