use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlSessionStore {
    pool: MySqlPool,
}

impl MySqlSessionStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlSessionStore { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<SessionRecord, StoreError> {
        let get = |col: &str| -> Result<String, StoreError> {
            row.try_get::<String, _>(col)
                .map_err(|e| StoreError::Corrupt(e.to_string()))
        };

        Ok(SessionRecord {
            external_account_id: ExternalAccountId(get("external_account_id")?),
            account_id: AccountId(get("account_id")?),
            access_token: AccessToken(get("access_token")?),
            refresh_token: RefreshToken(get("refresh_token")?),
        })
    }
}

#[async_trait::async_trait]
impl SessionStore for MySqlSessionStore {
    async fn put(
        &self,
        external_account_id: &ExternalAccountId,
        account_id: &AccountId,
        pair: &TokenPair,
    ) -> Result<(), StoreError> {
        // Single statement on the primary key: InnoDB row lock, whole-row replace.
        sqlx::query(
            r#"
INSERT INTO session (external_account_id, account_id, access_token, refresh_token)
VALUES (?, ?, ?, ?)
ON DUPLICATE KEY UPDATE
    account_id = VALUES(account_id),
    access_token = VALUES(access_token),
    refresh_token = VALUES(refresh_token),
    updated_at = CURRENT_TIMESTAMP
"#,
        )
        .bind(external_account_id.as_str())
        .bind(account_id.as_str())
        .bind(&pair.access_token.0)
        .bind(&pair.refresh_token.0)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn lookup(
        &self,
        account_id: &AccountId,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let sql = match kind {
            TokenKind::Access => {
                r#"
SELECT external_account_id, account_id, access_token, refresh_token
FROM session
WHERE account_id = ? AND access_token = ?
LIMIT 1
"#
            }
            TokenKind::Refresh => {
                r#"
SELECT external_account_id, account_id, access_token, refresh_token
FROM session
WHERE account_id = ? AND refresh_token = ?
LIMIT 1
"#
            }
        };

        let row_opt: Option<MySqlRow> = sqlx::query(sql)
            .bind(account_id.as_str())
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn get(
        &self,
        external_account_id: &ExternalAccountId,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT external_account_id, account_id, access_token, refresh_token
FROM session
WHERE external_account_id = ?
"#,
        )
        .bind(external_account_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn rotate(
        &self,
        external_account_id: &ExternalAccountId,
        account_id: &AccountId,
        refresh_token: &str,
        pair: &TokenPair,
    ) -> Result<bool, StoreError> {
        // The refresh_token predicate makes this a compare-and-set under the row lock.
        let result = sqlx::query(
            r#"
UPDATE session
SET access_token = ?, refresh_token = ?, updated_at = CURRENT_TIMESTAMP
WHERE external_account_id = ? AND account_id = ? AND refresh_token = ?
"#,
        )
        .bind(&pair.access_token.0)
        .bind(&pair.refresh_token.0)
        .bind(external_account_id.as_str())
        .bind(account_id.as_str())
        .bind(refresh_token)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, external_account_id: &ExternalAccountId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM session WHERE external_account_id = ?")
            .bind(external_account_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }
}
