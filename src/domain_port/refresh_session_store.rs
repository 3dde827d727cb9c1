use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// Persistence for refresh sessions.
///
/// Every method must be a single atomic operation against the backing store;
/// callers never read a row and write it back.
#[async_trait::async_trait]
pub trait RefreshSessionStore: Send + Sync {
    /// Persist a new session. A duplicate token id is an invariant violation.
    async fn create(&self, session: &RefreshSession) -> Result<(), SessionStoreError>;

    /// Return the session only if it is unrevoked and `now < expires_at`.
    /// Unknown, expired and revoked all yield `NotFound`.
    async fn find_active(
        &self,
        token_id: TokenId,
        now: DateTime<Utc>,
    ) -> Result<RefreshSession, SessionStoreError>;

    /// Mark a session revoked. No-op for a missing or already revoked row.
    async fn revoke(&self, token_id: TokenId) -> Result<(), SessionStoreError>;

    /// Revoke every active session of a user, returning how many flipped.
    async fn revoke_all(&self, user_id: UserId) -> Result<u64, SessionStoreError>;

    /// Delete rows with `expires_at <= now` or `revoked`, returning the count.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("refresh session not found")]
    NotFound,
    #[error("duplicate token id {0}")]
    Duplicate(TokenId),
    #[error("infra error: {0}")]
    Backend(String),
}
