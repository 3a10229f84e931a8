use crate::domain_model::*;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("session store call timed out")]
    Timeout,
    #[error("corrupt session record: {0}")]
    Corrupt(String),
}

/// Persistence boundary for live sessions, keyed by external account id.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Upsert. An existing record for the same external account id is
    /// replaced as a whole, never merged.
    async fn put(
        &self,
        external_account_id: &ExternalAccountId,
        account_id: &AccountId,
        pair: &TokenPair,
    ) -> Result<(), StoreError>;

    /// The record of `account_id` whose `kind` column equals `token`.
    async fn lookup(
        &self,
        account_id: &AccountId,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<SessionRecord>, StoreError>;

    /// The record stored under `external_account_id`, if any.
    async fn get(
        &self,
        external_account_id: &ExternalAccountId,
    ) -> Result<Option<SessionRecord>, StoreError>;

    /// Compare-and-set replace: writes `pair` only while the record of
    /// `account_id` under `external_account_id` still holds `refresh_token`.
    /// Returns false when the record is gone or was already rotated.
    async fn rotate(
        &self,
        external_account_id: &ExternalAccountId,
        account_id: &AccountId,
        refresh_token: &str,
        pair: &TokenPair,
    ) -> Result<bool, StoreError>;

    /// Removes the record. Deleting an absent record is not an error.
    async fn delete(&self, external_account_id: &ExternalAccountId) -> Result<(), StoreError>;

    async fn find(
        &self,
        account_id: &AccountId,
        token: &str,
        kind: TokenKind,
    ) -> Result<bool, StoreError> {
        Ok(self.lookup(account_id, token, kind).await?.is_some())
    }
}

/// Bounds every call of the wrapped store by a fixed deadline.
pub struct DeadlineSessionStore {
    inner: Arc<dyn SessionStore>,
    deadline: Duration,
}

impl DeadlineSessionStore {
    pub fn new(inner: Arc<dyn SessionStore>, deadline: Duration) -> Self {
        DeadlineSessionStore { inner, deadline }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.deadline, fut)
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}

#[async_trait::async_trait]
impl SessionStore for DeadlineSessionStore {
    async fn put(
        &self,
        external_account_id: &ExternalAccountId,
        account_id: &AccountId,
        pair: &TokenPair,
    ) -> Result<(), StoreError> {
        self.bounded(self.inner.put(external_account_id, account_id, pair))
            .await
    }

    async fn lookup(
        &self,
        account_id: &AccountId,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<SessionRecord>, StoreError> {
        self.bounded(self.inner.lookup(account_id, token, kind)).await
    }

    async fn get(
        &self,
        external_account_id: &ExternalAccountId,
    ) -> Result<Option<SessionRecord>, StoreError> {
        self.bounded(self.inner.get(external_account_id)).await
    }

    async fn rotate(
        &self,
        external_account_id: &ExternalAccountId,
        account_id: &AccountId,
        refresh_token: &str,
        pair: &TokenPair,
    ) -> Result<bool, StoreError> {
        self.bounded(
            self.inner
                .rotate(external_account_id, account_id, refresh_token, pair),
        )
        .await
    }

    async fn delete(&self, external_account_id: &ExternalAccountId) -> Result<(), StoreError> {
        self.bounded(self.inner.delete(external_account_id)).await
    }
}
