use crate::domain_model::{AccountId, ExternalAccountId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity asserted by every signed token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claims {
    pub account_id: AccountId,
}

impl Claims {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
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

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

impl TokenPair {
    pub fn token(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.access_token.0,
            TokenKind::Refresh => &self.refresh_token.0,
        }
    }
}

/// Durable counterpart of a [`TokenPair`], always written and removed whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub external_account_id: ExternalAccountId,
    pub account_id: AccountId,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

impl SessionRecord {
    pub fn new(external_account_id: ExternalAccountId, account_id: AccountId, pair: TokenPair) -> Self {
        Self {
            external_account_id,
            account_id,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }

    pub fn token(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.access_token.0,
            TokenKind::Refresh => &self.refresh_token.0,
        }
    }

    pub fn holds(&self, account_id: &AccountId, token: &str, kind: TokenKind) -> bool {
        &self.account_id == account_id && self.token(kind) == token
    }
}
