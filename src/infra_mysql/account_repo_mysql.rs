use super::util::dup_key_name;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlAccountRepo {
    pool: MySqlPool,
}

impl MySqlAccountRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlAccountRepo { pool }
    }

    fn row_to_profile(row: &MySqlRow) -> Result<AccountProfile, AuthError> {
        let get = |col: &str| -> Result<String, AuthError> {
            row.try_get::<String, _>(col)
                .map_err(|e| AuthError::Store(e.to_string()))
        };

        Ok(AccountProfile {
            account_id: AccountId(get("account_id")?),
            email: get("email")?,
            username: get("username")?,
            bio: get("bio")?,
            avatar: get("avatar")?,
        })
    }
}

#[async_trait::async_trait]
impl AccountRepo for MySqlAccountRepo {
    async fn create(&self, account: NewAccount) -> Result<AccountProfile, AuthError> {
        sqlx::query(
            r#"
INSERT INTO account (account_id, email, username, password_hash)
VALUES (?, ?, ?, ?)
"#,
        )
        .bind(account.account_id.as_str())
        .bind(&account.email)
        .bind(&account.username)
        .bind(&account.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| match dup_key_name(&e) {
            Some(key) if key.contains("email") => AuthError::EmailTaken,
            Some(key) if key.contains("username") => AuthError::UsernameTaken,
            _ => AuthError::Store(e.to_string()),
        })?;

        Ok(AccountProfile {
            account_id: account.account_id,
            email: account.email,
            username: account.username,
            bio: String::new(),
            avatar: String::new(),
        })
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT account_id, email, username, bio, avatar, password_hash
FROM account
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt
            .map(|row| {
                let password_hash: String = row
                    .try_get("password_hash")
                    .map_err(|e| AuthError::Store(e.to_string()))?;
                Ok(AccountCredentials {
                    profile: Self::row_to_profile(&row)?,
                    password_hash,
                })
            })
            .transpose()
    }

    async fn get_profile(&self, account_id: &AccountId) -> Result<Option<AccountProfile>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT account_id, email, username, bio, avatar
FROM account
WHERE account_id = ?
"#,
        )
        .bind(account_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.as_ref().map(Self::row_to_profile).transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM account WHERE email = ?"#)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(count > 0)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM account WHERE username = ?"#)
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(count > 0)
    }
}
