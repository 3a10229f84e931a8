use crate::domain_model::*;
use crate::domain_port::*;
use redis::Script;
use redis::aio::ConnectionManager;

const SESSION_PUT: &str = include_str!("session_put.lua");
const SESSION_LOOKUP: &str = include_str!("session_lookup.lua");
const SESSION_DELETE: &str = include_str!("session_delete.lua");
const SESSION_ROTATE: &str = include_str!("session_rotate.lua");

/// Sessions as a hash per external account id plus one index key per live
/// token. Every mutation runs as a single script, so the hash and its
/// index keys never disagree.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisSessionStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn session_key(&self, external_account_id: &ExternalAccountId) -> String {
        format!("{}:session:{}", self.prefix, external_account_id)
    }

    fn index_key(&self, kind: TokenKind, token: &str) -> String {
        format!("{}:{}:{}", self.prefix, kind, token)
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(
        &self,
        external_account_id: &ExternalAccountId,
        account_id: &AccountId,
        pair: &TokenPair,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = Script::new(SESSION_PUT)
            .key(self.session_key(external_account_id))
            .key(self.index_key(TokenKind::Access, &pair.access_token.0))
            .key(self.index_key(TokenKind::Refresh, &pair.refresh_token.0))
            .arg(&self.prefix)
            .arg(external_account_id.as_str())
            .arg(account_id.as_str())
            .arg(&pair.access_token.0)
            .arg(&pair.refresh_token.0)
            .invoke_async(&mut conn)
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
        let mut conn = self.conn.clone();
        let found: Option<(String, String, String, String)> = Script::new(SESSION_LOOKUP)
            .key(self.index_key(kind, token))
            .arg(&self.prefix)
            .arg(account_id.as_str())
            .arg(kind.to_string())
            .arg(token)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(found.map(|(ext, account, access, refresh)| SessionRecord {
            external_account_id: ExternalAccountId(ext),
            account_id: AccountId(account),
            access_token: AccessToken(access),
            refresh_token: RefreshToken(refresh),
        }))
    }

    async fn get(
        &self,
        external_account_id: &ExternalAccountId,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let (account, access, refresh): (Option<String>, Option<String>, Option<String>) =
            redis::cmd("HMGET")
                .arg(self.session_key(external_account_id))
                .arg("account_id")
                .arg("access_token")
                .arg("refresh_token")
                .query_async(&mut conn)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match (account, access, refresh) {
            (Some(account), Some(access), Some(refresh)) => Ok(Some(SessionRecord {
                external_account_id: external_account_id.clone(),
                account_id: AccountId(account),
                access_token: AccessToken(access),
                refresh_token: RefreshToken(refresh),
            })),
            (None, None, None) => Ok(None),
            _ => Err(StoreError::Corrupt(format!(
                "partial session hash for {}",
                external_account_id
            ))),
        }
    }

    async fn rotate(
        &self,
        external_account_id: &ExternalAccountId,
        account_id: &AccountId,
        refresh_token: &str,
        pair: &TokenPair,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let swapped: i64 = Script::new(SESSION_ROTATE)
            .key(self.session_key(external_account_id))
            .key(self.index_key(TokenKind::Access, &pair.access_token.0))
            .key(self.index_key(TokenKind::Refresh, &pair.refresh_token.0))
            .arg(&self.prefix)
            .arg(external_account_id.as_str())
            .arg(account_id.as_str())
            .arg(&pair.access_token.0)
            .arg(&pair.refresh_token.0)
            .arg(refresh_token)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(swapped == 1)
    }

    async fn delete(&self, external_account_id: &ExternalAccountId) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = Script::new(SESSION_DELETE)
            .key(self.session_key(external_account_id))
            .arg(&self.prefix)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
