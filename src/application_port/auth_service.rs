use crate::domain_model::*;
use crate::domain_port::StoreError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("token revoked")]
    Revoked,
    #[error("no token presented")]
    MissingToken,
    #[error("expected {expected} token, got {actual}")]
    WrongTokenKind { expected: TokenKind, actual: TokenKind },
    #[error("no permission to access this resource")]
    Forbidden,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    InvalidInput(String),
    #[error("email has been used")]
    EmailTaken,
    #[error("username has been used")]
    UsernameTaken,
    #[error("account not found")]
    AccountNotFound,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// True for every failure that means "the caller is not authenticated".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::Malformed
                | AuthError::SignatureInvalid
                | AuthError::Expired
                | AuthError::Revoked
                | AuthError::MissingToken
                | AuthError::WrongTokenKind { .. }
        )
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    pub external_account_id: ExternalAccountId,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// What sign-in and refresh hand back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct Passport {
    pub account: AccountProfile,
    pub token: SessionToken,
}

impl Passport {
    pub fn new(account: AccountProfile, record: SessionRecord) -> Self {
        Passport {
            account,
            token: SessionToken {
                external_account_id: record.external_account_id,
                access_token: record.access_token,
                refresh_token: record.refresh_token,
            },
        }
    }
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, request: SignUpInput) -> Result<AccountProfile, AuthError>;
    async fn sign_in(&self, request: SignInInput) -> Result<Passport, AuthError>;
    /// Revokes the session under `external_account_id`; the session must
    /// belong to the bound identity.
    async fn sign_out(
        &self,
        ctx: &RequestContext,
        external_account_id: &ExternalAccountId,
    ) -> Result<(), AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<Passport, AuthError>;
    async fn profile(&self, account_id: &AccountId) -> Result<AccountProfile, AuthError>;
}
