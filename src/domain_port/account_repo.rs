use crate::application_port::*;
use crate::domain_model::*;

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account_id: AccountId,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

#[async_trait::async_trait]
pub trait AccountRepo: Send + Sync {
    /// Fails with `EmailTaken` or `UsernameTaken` on a unique-key clash.
    async fn create(&self, account: NewAccount) -> Result<AccountProfile, AuthError>;

    /// Fetch credentials by email (for sign-in).
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, AuthError>;

    async fn get_profile(&self, account_id: &AccountId) -> Result<Option<AccountProfile>, AuthError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError>;
}
