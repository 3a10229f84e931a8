use crate::application_port::AuthError;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Per-token parameters of one `encode` call.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub kind: TokenKind,
    /// Shared by the two tokens of one pair.
    pub jti: String,
    pub issued_at: DateTime<Utc>,
    pub ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub claims: Claims,
    pub kind: TokenKind,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Turns [`Claims`] into a signed token string and back.
///
/// `encode` is a pure function of its inputs. `decode` checks the signature
/// first, then expiry against the current time, and reports each failure as
/// a distinct [`AuthError`]: `Malformed`, `SignatureInvalid` or `Expired`.
pub trait ClaimsCodec: Send + Sync {
    fn encode(&self, claims: &Claims, grant: &TokenGrant) -> Result<String, AuthError>;
    fn decode(&self, token: &str) -> Result<VerifiedToken, AuthError>;
}
