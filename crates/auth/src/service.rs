//! JWT token service
//!
//! Issues HS256-signed access/refresh tokens and validates them against the
//! same shared secret. The service holds only immutable keys and lifetimes,
//! so one instance is cloned into every request handler without locking.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::Claims;
use crate::error::TokenError;

/// Algorithm used when signing
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Header algorithms accepted when verifying: the HMAC family only
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Which lifetime a token was issued with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Access and refresh token issued together for one principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signing material built once per secret and shared by every clone
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// Issues and validates signed tokens
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
    access_ttl: TimeDelta,
    refresh_ttl: TimeDelta,
}

impl TokenService {
    /// Create a service for one shared secret and the two token lifetimes.
    ///
    /// The secret is not checked for emptiness; that belongs to whoever
    /// loads it (see [`crate::TokenConfig`]). `iat` and `exp` are whole
    /// seconds, so a lifetime under one second is effectively zero: such
    /// tokens are expired as soon as they are issued. Lifetimes too large to
    /// add to the current time make issuing fail with [`TokenError::Signing`].
    pub fn new(secret: impl AsRef<[u8]>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let secret = secret.as_ref();

        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                validation: build_validation(),
            }),
            access_ttl: TimeDelta::from_std(access_ttl).unwrap_or(TimeDelta::MAX),
            refresh_ttl: TimeDelta::from_std(refresh_ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn access_ttl(&self) -> TimeDelta {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> TimeDelta {
        self.refresh_ttl
    }

    /// Sign a token with the lifetime configured for `kind`
    pub fn issue(
        &self,
        kind: TokenKind,
        user_id: &str,
        email: &str,
        role: &str,
    ) -> Result<String, TokenError> {
        self.issue_at(kind, user_id, email, role, Utc::now())
    }

    /// Sign a short-lived access token
    pub fn issue_access_token(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
    ) -> Result<String, TokenError> {
        self.issue(TokenKind::Access, user_id, email, role)
    }

    /// Sign a refresh token.
    ///
    /// Carries the same claims as the access token so a refresh exchange can
    /// mint a new pair without a user lookup.
    pub fn issue_refresh_token(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
    ) -> Result<String, TokenError> {
        self.issue(TokenKind::Refresh, user_id, email, role)
    }

    /// Sign an access token and a refresh token; either both or neither
    pub fn issue_token_pair(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
    ) -> Result<TokenPair, TokenError> {
        let access_token = self.issue_access_token(user_id, email, role)?;
        let refresh_token = self.issue_refresh_token(user_id, email, role)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify structure, algorithm, signature and expiry.
    ///
    /// Returns [`TokenError::TokenExpired`] only for authentic tokens whose
    /// `exp` has been reached; every other failure is
    /// [`TokenError::InvalidToken`].
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Read the claims of an authentic token without looking at expiry.
    ///
    /// For diagnostics such as naming the user whose session expired. Never
    /// use the result to authorize anything.
    pub fn claims_from_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_verified(token)
    }

    pub(crate) fn validate_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let claims = self.decode_verified(token)?;

        if claims.is_expired_at(now) {
            tracing::debug!(user_id = %claims.user_id, exp = claims.exp, "JWT expired");
            return Err(TokenError::TokenExpired);
        }

        Ok(claims)
    }

    pub(crate) fn issue_at(
        &self,
        kind: TokenKind,
        user_id: &str,
        email: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            tracing::error!(kind = %kind, "Token lifetime out of range");
            TokenError::Signing(format!("{} token lifetime out of range", kind))
        })?;

        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.keys.encoding).map_err(|e| {
            tracing::error!(error = %e, kind = %kind, "Failed to sign JWT");
            TokenError::Signing(e.to_string())
        })
    }

    fn decode_verified(&self, token: &str) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::InvalidToken);
        }

        let token_data =
            decode::<Claims>(token, &self.keys.decoding, &self.keys.validation).map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                TokenError::InvalidToken
            })?;

        Ok(token_data.claims)
    }
}

impl fmt::Debug for TokenService {
    #[mutants::skip] // Formatting only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Structural, algorithm and signature checks shared by both read paths.
///
/// Expiry is left to [`TokenService::validate_token_at`] so it can be
/// evaluated against sub-second time and skipped for lenient reads.
fn build_validation() -> Validation {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);
    validation
}
