use crate::application_port::{AuthError, ClaimsCodec, VerifiedToken};
use crate::domain_model::*;
use crate::domain_port::SessionStore;
use crate::logger::*;
use std::sync::Arc;

/// Cryptographic check followed by a store membership check. A token that
/// verifies but is no longer in the store is revoked.
pub struct SessionValidator {
    codec: Arc<dyn ClaimsCodec>,
    store: Arc<dyn SessionStore>,
}

impl SessionValidator {
    pub fn new(codec: Arc<dyn ClaimsCodec>, store: Arc<dyn SessionStore>) -> Self {
        Self { codec, store }
    }

    pub async fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let verified = self.decode_expecting(token, expected)?;
        if !self
            .store
            .find(&verified.claims.account_id, token, expected)
            .await?
        {
            debug!(account_id = %verified.claims.account_id, kind = %expected, "token not in session store");
            return Err(AuthError::Revoked);
        }
        Ok(verified.claims)
    }

    /// Like [`validate`](Self::validate) but returns the stored record too.
    pub async fn validate_session(
        &self,
        token: &str,
        expected: TokenKind,
    ) -> Result<(VerifiedToken, SessionRecord), AuthError> {
        let verified = self.decode_expecting(token, expected)?;
        let record = self
            .store
            .lookup(&verified.claims.account_id, token, expected)
            .await?
            .ok_or_else(|| {
                debug!(account_id = %verified.claims.account_id, kind = %expected, "token not in session store");
                AuthError::Revoked
            })?;
        Ok((verified, record))
    }

    fn decode_expecting(&self, token: &str, expected: TokenKind) -> Result<VerifiedToken, AuthError> {
        let verified = self.codec.decode(token)?;
        if verified.kind != expected {
            return Err(AuthError::WrongTokenKind {
                expected,
                actual: verified.kind,
            });
        }
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtConfig, JwtHs256Codec, TokenIssuer, TokenLifetimes};
    use crate::infra_memory::MemorySessionStore;
    use std::time::Duration;

    struct Fixture {
        issuer: TokenIssuer,
        store: Arc<MemorySessionStore>,
        validator: SessionValidator,
    }

    fn fixture() -> Fixture {
        let codec: Arc<dyn ClaimsCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: "passport.test".to_string(),
            signing_key: b"secret".to_vec(),
        }));
        let lifetimes = Arc::new(TokenLifetimes::new(
            Duration::from_secs(60),
            Duration::from_secs(600),
        ).unwrap());
        let store = Arc::new(MemorySessionStore::new());
        Fixture {
            issuer: TokenIssuer::new(codec.clone(), lifetimes),
            validator: SessionValidator::new(codec, store.clone()),
            store,
        }
    }

    #[tokio::test]
    async fn stored_access_token_validates() {
        let f = fixture();
        let account = AccountId::from("u1");
        let pair = f.issuer.issue(&account).unwrap();
        f.store
            .put(&ExternalAccountId::from("ext-1"), &account, &pair)
            .await
            .unwrap();

        let claims = f
            .validator
            .validate(&pair.access_token.0, TokenKind::Access)
            .await
            .unwrap();
        assert_eq!(claims.account_id, account);
    }

    #[tokio::test]
    async fn unstored_token_is_revoked() {
        let f = fixture();
        let pair = f.issuer.issue(&AccountId::from("u1")).unwrap();

        let err = f
            .validator
            .validate(&pair.access_token.0, TokenKind::Access)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Revoked));
    }

    #[tokio::test]
    async fn deleted_session_is_revoked() {
        let f = fixture();
        let account = AccountId::from("u1");
        let ext = ExternalAccountId::from("ext-1");
        let pair = f.issuer.issue(&account).unwrap();
        f.store.put(&ext, &account, &pair).await.unwrap();
        f.store.delete(&ext).await.unwrap();

        let err = f
            .validator
            .validate(&pair.access_token.0, TokenKind::Access)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Revoked));
    }

    #[tokio::test]
    async fn refresh_token_is_rejected_where_access_is_expected() {
        let f = fixture();
        let account = AccountId::from("u1");
        let pair = f.issuer.issue(&account).unwrap();
        f.store
            .put(&ExternalAccountId::from("ext-1"), &account, &pair)
            .await
            .unwrap();

        let err = f
            .validator
            .validate(&pair.refresh_token.0, TokenKind::Access)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::WrongTokenKind {
                expected: TokenKind::Access,
                actual: TokenKind::Refresh
            }
        ));
    }

    #[tokio::test]
    async fn codec_errors_pass_through_unchanged() {
        let f = fixture();
        let err = f
            .validator
            .validate("garbage", TokenKind::Access)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Malformed));
    }

    #[tokio::test]
    async fn validate_session_returns_the_record() {
        let f = fixture();
        let account = AccountId::from("u1");
        let ext = ExternalAccountId::from("ext-1");
        let pair = f.issuer.issue(&account).unwrap();
        f.store.put(&ext, &account, &pair).await.unwrap();

        let (verified, record) = f
            .validator
            .validate_session(&pair.refresh_token.0, TokenKind::Refresh)
            .await
            .unwrap();
        assert_eq!(verified.claims.account_id, account);
        assert_eq!(record.external_account_id, ext);
    }
}
