//! JWT claims types

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by both access and refresh tokens.
///
/// `iat` and `exp` are NumericDate values (whole seconds since the epoch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated principal
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    /// Authorization tier, e.g. `USER` or `ADMIN`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    /// Expires at
    pub exp: i64,
    /// Issued at
    pub iat: i64,
}

impl Claims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Gap between issue and expiry
    pub fn lifetime(&self) -> TimeDelta {
        TimeDelta::seconds(self.exp.saturating_sub(self.iat))
    }

    /// A token is expired from the `exp` instant onwards
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
