use crate::application_impl::{SessionValidator, TokenIssuer, authorize};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{AccountRepo, NewAccount, SessionStore};
use crate::logger::*;
use std::sync::Arc;

pub struct RealAuthService {
    account_repo: Arc<dyn AccountRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    issuer: Arc<TokenIssuer>,
    validator: Arc<SessionValidator>,
    session_store: Arc<dyn SessionStore>,
    min_username_len: usize,
    min_password_len: usize,
}

impl RealAuthService {
    pub fn new(
        account_repo: Arc<dyn AccountRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        issuer: Arc<TokenIssuer>,
        validator: Arc<SessionValidator>,
        session_store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            account_repo,
            credential_hasher,
            issuer,
            validator,
            session_store,
            min_username_len: 3,
            min_password_len: 6,
        }
    }

    fn validate_sign_up(&self, request: &SignUpInput) -> Result<(), AuthError> {
        if !is_email(&request.email) {
            return Err(AuthError::InvalidInput("email is invalid".to_string()));
        }
        if request.username.len() < self.min_username_len {
            return Err(AuthError::InvalidInput("username too short".to_string()));
        }
        if request.password.len() < self.min_password_len {
            return Err(AuthError::InvalidInput("password too short".to_string()));
        }
        Ok(())
    }

    async fn load_profile(&self, account_id: &AccountId) -> Result<AccountProfile, AuthError> {
        self.account_repo
            .get_profile(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }
}

fn is_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn sign_up(&self, request: SignUpInput) -> Result<AccountProfile, AuthError> {
        self.validate_sign_up(&request)?;

        if self.account_repo.email_exists(&request.email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.account_repo.username_exists(&request.username).await? {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.credential_hasher.hash_password(&request.password).await?;
        let profile = self
            .account_repo
            .create(NewAccount {
                account_id: AccountId::new_random(),
                email: request.email,
                username: request.username,
                password_hash,
            })
            .await?;

        info!(account_id = %profile.account_id, "account created");
        Ok(profile)
    }

    async fn sign_in(&self, request: SignInInput) -> Result<Passport, AuthError> {
        let creds = self
            .account_repo
            .find_credentials_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(&request.password, &creds.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let account_id = creds.profile.account_id.clone();
        let pair = self.issuer.issue(&account_id)?;
        let external_account_id = ExternalAccountId::new_random();
        self.session_store
            .put(&external_account_id, &account_id, &pair)
            .await?;

        info!(%account_id, %external_account_id, "signed in");
        Ok(Passport::new(
            creds.profile,
            SessionRecord::new(external_account_id, account_id, pair),
        ))
    }

    async fn sign_out(
        &self,
        ctx: &RequestContext,
        external_account_id: &ExternalAccountId,
    ) -> Result<(), AuthError> {
        let Some(record) = self.session_store.get(external_account_id).await? else {
            debug!(%external_account_id, "sign-out of absent session");
            return Ok(());
        };
        if let Err(e) = authorize(Some(ctx), &record.account_id) {
            warn!(
                account_id = %ctx.account_id,
                %external_account_id,
                "sign-out of a foreign session refused"
            );
            return Err(e);
        }

        self.session_store.delete(external_account_id).await?;
        info!(account_id = %ctx.account_id, %external_account_id, "signed out");
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Passport, AuthError> {
        let (verified, record) = self
            .validator
            .validate_session(refresh_token, TokenKind::Refresh)
            .await?;
        let account_id = verified.claims.account_id;

        // Only the record still holding this refresh token is replaced, so a
        // concurrent refresh or sign-out that got there first wins.
        let pair = self.issuer.issue(&account_id)?;
        let rotated = self
            .session_store
            .rotate(&record.external_account_id, &account_id, refresh_token, &pair)
            .await?;
        if !rotated {
            debug!(%account_id, external_account_id = %record.external_account_id, "rotation lost");
            return Err(AuthError::Revoked);
        }

        let profile = self.load_profile(&account_id).await?;
        debug!(%account_id, external_account_id = %record.external_account_id, "session rotated");
        Ok(Passport::new(
            profile,
            SessionRecord::new(record.external_account_id, account_id, pair),
        ))
    }

    async fn profile(&self, account_id: &AccountId) -> Result<AccountProfile, AuthError> {
        self.load_profile(account_id).await
    }
}
