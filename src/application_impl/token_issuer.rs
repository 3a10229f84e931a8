use crate::application_port::{AuthError, ClaimsCodec, TokenGrant};
use crate::domain_model::*;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Longest lifetime a token may be issued with.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

fn checked_ttl(kind: TokenKind, ttl: Duration) -> Result<u64, AuthError> {
    if ttl.is_zero() || ttl > MAX_TOKEN_TTL {
        return Err(AuthError::InvalidInput(format!(
            "{} token ttl must be between 1s and {}s, got {}s",
            kind,
            MAX_TOKEN_TTL.as_secs(),
            ttl.as_secs()
        )));
    }
    Ok(ttl.as_secs())
}

/// Access and refresh lifetimes, retunable while the server runs.
#[derive(Debug)]
pub struct TokenLifetimes {
    access_secs: AtomicU64,
    refresh_secs: AtomicU64,
}

impl TokenLifetimes {
    pub fn new(access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, AuthError> {
        Ok(Self {
            access_secs: AtomicU64::new(checked_ttl(TokenKind::Access, access_ttl)?),
            refresh_secs: AtomicU64::new(checked_ttl(TokenKind::Refresh, refresh_ttl)?),
        })
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_secs.load(Ordering::Acquire))
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.load(Ordering::Acquire))
    }

    pub fn set_access_ttl(&self, ttl: Duration) -> Result<(), AuthError> {
        let secs = checked_ttl(TokenKind::Access, ttl)?;
        self.access_secs.store(secs, Ordering::Release);
        Ok(())
    }

    pub fn set_refresh_ttl(&self, ttl: Duration) -> Result<(), AuthError> {
        let secs = checked_ttl(TokenKind::Refresh, ttl)?;
        self.refresh_secs.store(secs, Ordering::Release);
        Ok(())
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl(),
            TokenKind::Refresh => self.refresh_ttl(),
        }
    }
}

/// Mints access/refresh pairs. Persisting them is the caller's job.
pub struct TokenIssuer {
    codec: Arc<dyn ClaimsCodec>,
    lifetimes: Arc<TokenLifetimes>,
}

impl TokenIssuer {
    pub fn new(codec: Arc<dyn ClaimsCodec>, lifetimes: Arc<TokenLifetimes>) -> Self {
        Self { codec, lifetimes }
    }

    #[inline]
    fn new_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn issue(&self, account_id: &AccountId) -> Result<TokenPair, AuthError> {
        let claims = Claims::new(account_id.clone());
        let jti = Self::new_jti();
        let issued_at = Utc::now();

        let mint = |kind: TokenKind| {
            let grant = TokenGrant {
                kind,
                jti: jti.clone(),
                issued_at,
                ttl: self.lifetimes.ttl(kind),
            };
            self.codec.encode(&claims, &grant)
        };

        Ok(TokenPair {
            access_token: AccessToken(mint(TokenKind::Access)?),
            refresh_token: RefreshToken(mint(TokenKind::Refresh)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtConfig, JwtHs256Codec};

    fn issuer(lifetimes: Arc<TokenLifetimes>) -> (TokenIssuer, Arc<dyn ClaimsCodec>) {
        let codec: Arc<dyn ClaimsCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: "passport.test".to_string(),
            signing_key: b"secret".to_vec(),
        }));
        (TokenIssuer::new(codec.clone(), lifetimes), codec)
    }

    #[test]
    fn pair_shares_claims_but_not_lifetime() {
        let lifetimes = Arc::new(TokenLifetimes::new(
            Duration::from_secs(60),
            Duration::from_secs(3600),
        ).unwrap());
        let (issuer, codec) = issuer(lifetimes);

        let pair = issuer.issue(&AccountId::from("u1")).unwrap();
        let access = codec.decode(&pair.access_token.0).unwrap();
        let refresh = codec.decode(&pair.refresh_token.0).unwrap();

        assert_eq!(access.claims, refresh.claims);
        assert_eq!(access.jti, refresh.jti);
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert!(refresh.expires_at - access.expires_at >= chrono::Duration::seconds(3500));
    }

    #[test]
    fn consecutive_pairs_differ() {
        let lifetimes = Arc::new(TokenLifetimes::new(
            Duration::from_secs(60),
            Duration::from_secs(3600),
        ).unwrap());
        let (issuer, _) = issuer(lifetimes);
        let a = issuer.issue(&AccountId::from("u1")).unwrap();
        let b = issuer.issue(&AccountId::from("u1")).unwrap();
        assert_ne!(a.access_token, b.access_token);
        assert_ne!(a.refresh_token, b.refresh_token);
    }

    #[test]
    fn retuned_lifetimes_apply_to_next_issue() {
        let lifetimes = Arc::new(TokenLifetimes::new(
            Duration::from_secs(60),
            Duration::from_secs(3600),
        ).unwrap());
        let (issuer, codec) = issuer(lifetimes.clone());

        lifetimes.set_access_ttl(Duration::from_secs(7200)).unwrap();
        lifetimes.set_refresh_ttl(Duration::from_secs(7200)).unwrap();
        assert_eq!(lifetimes.access_ttl(), Duration::from_secs(7200));

        let pair = issuer.issue(&AccountId::from("u1")).unwrap();
        let access = codec.decode(&pair.access_token.0).unwrap();
        let refresh = codec.decode(&pair.refresh_token.0).unwrap();
        assert_eq!(access.expires_at, refresh.expires_at);
    }

    #[test]
    fn out_of_range_lifetimes_are_rejected() {
        let err = TokenLifetimes::new(Duration::ZERO, Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
        let err = TokenLifetimes::new(Duration::from_secs(60), Duration::from_secs(u64::MAX / 2))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));

        let lifetimes = TokenLifetimes::new(Duration::from_secs(60), Duration::from_secs(3600)).unwrap();
        assert!(lifetimes.set_access_ttl(Duration::from_secs(u64::MAX / 2)).is_err());
        assert!(lifetimes.set_refresh_ttl(MAX_TOKEN_TTL + Duration::from_secs(1)).is_err());
        assert_eq!(lifetimes.access_ttl(), Duration::from_secs(60));
        assert_eq!(lifetimes.refresh_ttl(), Duration::from_secs(3600));

        lifetimes.set_refresh_ttl(MAX_TOKEN_TTL).unwrap();
        assert_eq!(lifetimes.refresh_ttl(), MAX_TOKEN_TTL);
    }
}
