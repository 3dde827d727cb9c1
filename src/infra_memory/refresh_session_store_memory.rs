use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

/// Process-local session store keyed by token id.
///
/// Each operation holds the shard lock for the row it touches, so per-row
/// reads and writes are atomic. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<TokenId, RefreshSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token_id: TokenId) -> Option<RefreshSession> {
        self.sessions.get(&token_id).map(|s| s.clone())
    }

    pub fn sessions_for(&self, user_id: UserId) -> Vec<RefreshSession> {
        self.sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait::async_trait]
impl RefreshSessionStore for MemorySessionStore {
    async fn create(&self, session: &RefreshSession) -> Result<(), SessionStoreError> {
        match self.sessions.entry(session.token_id) {
            Entry::Occupied(_) => Err(SessionStoreError::Duplicate(session.token_id)),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
                Ok(())
            }
        }
    }

    async fn find_active(
        &self,
        token_id: TokenId,
        now: DateTime<Utc>,
    ) -> Result<RefreshSession, SessionStoreError> {
        let Some(session) = self.sessions.get(&token_id) else {
            debug!(%token_id, "refresh session unknown");
            return Err(SessionStoreError::NotFound);
        };
        if !session.is_active_at(now) {
            debug!(
                %token_id,
                revoked = session.revoked,
                expired = session.expires_at <= now,
                "refresh session inactive"
            );
            return Err(SessionStoreError::NotFound);
        }
        Ok(session.clone())
    }

    async fn revoke(&self, token_id: TokenId) -> Result<(), SessionStoreError> {
        if let Some(mut session) = self.sessions.get_mut(&token_id) {
            session.revoked = true;
        }
        Ok(())
    }

    async fn revoke_all(&self, user_id: UserId) -> Result<u64, SessionStoreError> {
        let mut revoked = 0;
        for mut session in self.sessions.iter_mut() {
            if session.user_id == user_id && !session.revoked {
                session.revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let mut removed = 0;
        self.sessions.retain(|_, session| {
            let reap = session.is_reapable_at(now);
            if reap {
                removed += 1;
            }
            !reap
        });
        Ok(removed)
    }
}
