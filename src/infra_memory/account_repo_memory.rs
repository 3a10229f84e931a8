use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct MemoryAccountRepo {
    accounts: Mutex<HashMap<AccountId, AccountCredentials>>,
}

impl MemoryAccountRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<AccountId, AccountCredentials>>, AuthError> {
        self.accounts
            .lock()
            .map_err(|e| AuthError::Store(e.to_string()))
    }
}

#[async_trait::async_trait]
impl AccountRepo for MemoryAccountRepo {
    async fn create(&self, account: NewAccount) -> Result<AccountProfile, AuthError> {
        let mut accounts = self.lock()?;
        if accounts.values().any(|c| c.profile.email == account.email) {
            return Err(AuthError::EmailTaken);
        }
        if accounts.values().any(|c| c.profile.username == account.username) {
            return Err(AuthError::UsernameTaken);
        }

        let profile = AccountProfile {
            account_id: account.account_id.clone(),
            email: account.email,
            username: account.username,
            bio: String::new(),
            avatar: String::new(),
        };
        accounts.insert(
            account.account_id,
            AccountCredentials {
                profile: profile.clone(),
                password_hash: account.password_hash,
            },
        );
        Ok(profile)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, AuthError> {
        Ok(self
            .lock()?
            .values()
            .find(|c| c.profile.email == email)
            .cloned())
    }

    async fn get_profile(&self, account_id: &AccountId) -> Result<Option<AccountProfile>, AuthError> {
        Ok(self.lock()?.get(account_id).map(|c| c.profile.clone()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.lock()?.values().any(|c| c.profile.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self.lock()?.values().any(|c| c.profile.username == username))
    }
}
