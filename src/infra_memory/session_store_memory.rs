use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

/// Process-local session store. Each record sits behind its own shard lock,
/// so `put` replaces a record in one step. `tokens` maps every live token to
/// its record; an entry left behind by a racing writer is harmless because
/// `lookup` re-checks the record itself.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<ExternalAccountId, SessionRecord>,
    tokens: DashMap<(TokenKind, String), ExternalAccountId>,
}

const KINDS: [TokenKind; 2] = [TokenKind::Access, TokenKind::Refresh];

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn index(&self, record: &SessionRecord) {
        for kind in KINDS {
            self.tokens.insert(
                (kind, record.token(kind).to_string()),
                record.external_account_id.clone(),
            );
        }
    }

    /// Drops the index entries of `stale`, keeping any token `current` reuses.
    fn unindex(&self, stale: &SessionRecord, current: Option<&SessionRecord>) {
        for kind in KINDS {
            let token = stale.token(kind);
            if current.is_some_and(|c| c.token(kind) == token) {
                continue;
            }
            self.tokens
                .remove_if(&(kind, token.to_string()), |_, owner| {
                    owner == &stale.external_account_id
                });
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(
        &self,
        external_account_id: &ExternalAccountId,
        account_id: &AccountId,
        pair: &TokenPair,
    ) -> Result<(), StoreError> {
        let record = SessionRecord::new(
            external_account_id.clone(),
            account_id.clone(),
            pair.clone(),
        );
        self.index(&record);
        if let Some(old) = self
            .sessions
            .insert(external_account_id.clone(), record.clone())
        {
            self.unindex(&old, Some(&record));
        }
        Ok(())
    }

    async fn lookup(
        &self,
        account_id: &AccountId,
        token: &str,
        kind: TokenKind,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let Some(external_account_id) = self
            .tokens
            .get(&(kind, token.to_string()))
            .map(|entry| entry.value().clone())
        else {
            return Ok(None);
        };

        Ok(self
            .sessions
            .get(&external_account_id)
            .filter(|entry| entry.holds(account_id, token, kind))
            .map(|entry| entry.value().clone()))
    }

    async fn get(
        &self,
        external_account_id: &ExternalAccountId,
    ) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self
            .sessions
            .get(external_account_id)
            .map(|entry| entry.value().clone()))
    }

    async fn rotate(
        &self,
        external_account_id: &ExternalAccountId,
        account_id: &AccountId,
        refresh_token: &str,
        pair: &TokenPair,
    ) -> Result<bool, StoreError> {
        let Some(mut entry) = self.sessions.get_mut(external_account_id) else {
            return Ok(false);
        };
        if !entry.holds(account_id, refresh_token, TokenKind::Refresh) {
            return Ok(false);
        }

        let record = SessionRecord::new(
            external_account_id.clone(),
            account_id.clone(),
            pair.clone(),
        );
        self.index(&record);
        let old = std::mem::replace(entry.value_mut(), record.clone());
        drop(entry);
        self.unindex(&old, Some(&record));
        Ok(true)
    }

    async fn delete(&self, external_account_id: &ExternalAccountId) -> Result<(), StoreError> {
        if let Some((_, old)) = self.sessions.remove(external_account_id) {
            self.unindex(&old, None);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access_token: AccessToken(access.to_string()),
            refresh_token: RefreshToken(refresh.to_string()),
        }
    }

    #[tokio::test]
    async fn put_replaces_the_whole_record() {
        let store = MemorySessionStore::new();
        let ext = ExternalAccountId::from("ext-1");
        let account = AccountId::from("u1");

        store.put(&ext, &account, &pair("a1", "r1")).await.unwrap();
        store.put(&ext, &account, &pair("a2", "r2")).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.tokens.len(), 2);
        assert!(!store.find(&account, "a1", TokenKind::Access).await.unwrap());
        assert!(!store.find(&account, "r1", TokenKind::Refresh).await.unwrap());
        assert!(store.find(&account, "a2", TokenKind::Access).await.unwrap());
        assert!(store.find(&account, "r2", TokenKind::Refresh).await.unwrap());
    }

    #[tokio::test]
    async fn find_requires_matching_account() {
        let store = MemorySessionStore::new();
        store
            .put(&ExternalAccountId::from("ext-1"), &AccountId::from("u1"), &pair("a", "r"))
            .await
            .unwrap();
        assert!(!store.find(&AccountId::from("u2"), "a", TokenKind::Access).await.unwrap());
    }

    #[tokio::test]
    async fn lookup_returns_the_external_account_id() {
        let store = MemorySessionStore::new();
        let ext = ExternalAccountId::from("ext-9");
        store.put(&ext, &AccountId::from("u1"), &pair("a", "r")).await.unwrap();

        let rec = store
            .lookup(&AccountId::from("u1"), "r", TokenKind::Refresh)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rec.external_account_id, ext);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemorySessionStore::new();
        let ext = ExternalAccountId::from("ext-1");
        store.put(&ext, &AccountId::from("u1"), &pair("a", "r")).await.unwrap();

        store.delete(&ext).await.unwrap();
        store.delete(&ext).await.unwrap();
        assert!(store.is_empty());
        assert!(store.tokens.is_empty());
    }

    #[tokio::test]
    async fn lookup_goes_through_the_token_index() {
        let store = MemorySessionStore::new();
        let account = AccountId::from("u1");
        for i in 0..100 {
            store
                .put(
                    &ExternalAccountId::from(format!("ext-{i}").as_str()),
                    &account,
                    &pair(&format!("a{i}"), &format!("r{i}")),
                )
                .await
                .unwrap();
        }
        assert_eq!(store.tokens.len(), 200);

        let rec = store
            .lookup(&account, "a42", TokenKind::Access)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rec.external_account_id, ExternalAccountId::from("ext-42"));
        assert!(store.lookup(&account, "a42", TokenKind::Refresh).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn same_token_put_twice_stays_indexed() {
        let store = MemorySessionStore::new();
        let ext = ExternalAccountId::from("ext-1");
        let account = AccountId::from("u1");
        store.put(&ext, &account, &pair("a", "r")).await.unwrap();
        store.put(&ext, &account, &pair("a", "r")).await.unwrap();
        assert!(store.find(&account, "a", TokenKind::Access).await.unwrap());
        assert!(store.find(&account, "r", TokenKind::Refresh).await.unwrap());
    }

    #[tokio::test]
    async fn get_returns_the_record_by_external_id() {
        let store = MemorySessionStore::new();
        let ext = ExternalAccountId::from("ext-1");
        store.put(&ext, &AccountId::from("u1"), &pair("a", "r")).await.unwrap();

        let rec = store.get(&ext).await.unwrap().unwrap();
        assert_eq!(rec.account_id, AccountId::from("u1"));
        assert!(store.get(&ExternalAccountId::from("ext-2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rotate_requires_the_current_refresh_token() {
        let store = MemorySessionStore::new();
        let ext = ExternalAccountId::from("ext-1");
        let account = AccountId::from("u1");
        store.put(&ext, &account, &pair("a1", "r1")).await.unwrap();

        assert!(store.rotate(&ext, &account, "r1", &pair("a2", "r2")).await.unwrap());
        assert!(!store.rotate(&ext, &account, "r1", &pair("a3", "r3")).await.unwrap());
        assert!(!store.rotate(&ext, &AccountId::from("u2"), "r2", &pair("a3", "r3")).await.unwrap());

        assert!(!store.find(&account, "a1", TokenKind::Access).await.unwrap());
        assert!(store.find(&account, "a2", TokenKind::Access).await.unwrap());
        assert_eq!(store.tokens.len(), 2);
    }

    #[tokio::test]
    async fn rotate_does_not_revive_a_deleted_session() {
        let store = MemorySessionStore::new();
        let ext = ExternalAccountId::from("ext-1");
        let account = AccountId::from("u1");
        store.put(&ext, &account, &pair("a1", "r1")).await.unwrap();
        store.delete(&ext).await.unwrap();

        assert!(!store.rotate(&ext, &account, "r1", &pair("a2", "r2")).await.unwrap());
        assert!(store.is_empty());
        assert!(store.tokens.is_empty());
    }

    #[tokio::test]
    async fn concurrent_puts_leave_exactly_one_record() {
        let store = std::sync::Arc::new(MemorySessionStore::new());
        let ext = ExternalAccountId::from("ext-1");
        let account = AccountId::from("u1");

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let ext = ext.clone();
            let account = account.clone();
            handles.push(tokio::spawn(async move {
                store
                    .put(&ext, &account, &pair(&format!("a{i}"), &format!("r{i}")))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.len(), 1);
        let mut live = 0;
        for i in 0..16 {
            if store.find(&account, &format!("a{i}"), TokenKind::Access).await.unwrap() {
                live += 1;
                assert!(store.find(&account, &format!("r{i}"), TokenKind::Refresh).await.unwrap());
            }
        }
        assert_eq!(live, 1);
    }
}
