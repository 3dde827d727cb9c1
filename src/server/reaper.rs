use super::scheduler::RecurringJob;
use crate::domain_port::*;
use std::sync::Arc;

/// Deletes refresh sessions that are expired or revoked. Active rows are
/// never touched, so a session mid-rotation is safe from a concurrent sweep.
pub struct ExpiryReaper {
    session_store: Arc<dyn RefreshSessionStore>,
    clock: Arc<dyn Clock>,
}

impl ExpiryReaper {
    pub fn new(session_store: Arc<dyn RefreshSessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            session_store,
            clock,
        }
    }

    pub async fn sweep(&self) -> Result<u64, SessionStoreError> {
        self.session_store.delete_expired(self.clock.now()).await
    }
}

#[async_trait::async_trait]
impl RecurringJob for ExpiryReaper {
    fn name(&self) -> &'static str {
        "expiry-reaper"
    }

    async fn run(&self) -> anyhow::Result<()> {
        let removed = self.sweep().await?;
        if removed > 0 {
            tracing::info!(removed, "deleted stale refresh sessions");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::*;
    use crate::infra_memory::MemorySessionStore;
    use chrono::{DateTime, Duration, Utc};

    struct BrokenStore;

    #[async_trait::async_trait]
    impl RefreshSessionStore for BrokenStore {
        async fn create(&self, _: &RefreshSession) -> Result<(), SessionStoreError> {
            Err(SessionStoreError::Backend("down".into()))
        }

        async fn find_active(
            &self,
            _: TokenId,
            _: DateTime<Utc>,
        ) -> Result<RefreshSession, SessionStoreError> {
            Err(SessionStoreError::Backend("down".into()))
        }

        async fn revoke(&self, _: TokenId) -> Result<(), SessionStoreError> {
            Err(SessionStoreError::Backend("down".into()))
        }

        async fn revoke_all(&self, _: UserId) -> Result<u64, SessionStoreError> {
            Err(SessionStoreError::Backend("down".into()))
        }

        async fn delete_expired(&self, _: DateTime<Utc>) -> Result<u64, SessionStoreError> {
            Err(SessionStoreError::Backend("down".into()))
        }
    }

    #[tokio::test]
    async fn sweep_reports_removed_rows_and_keeps_active() {
        let store = Arc::new(MemorySessionStore::new());
        let now = Utc::now();
        let user = UserId::new_v4();
        let active = RefreshSession::new(TokenId::generate(), user, now + Duration::hours(1), now);
        let stale = RefreshSession::new(
            TokenId::generate(),
            user,
            now - Duration::hours(1),
            now - Duration::days(8),
        );
        store.create(&active).await.expect("create");
        store.create(&stale).await.expect("create");
        let reaper = ExpiryReaper::new(store.clone(), Arc::new(SystemClock));

        assert_eq!(reaper.sweep().await.expect("sweep"), 1);
        assert_eq!(reaper.sweep().await.expect("second sweep"), 0);
        assert!(store.get(active.token_id).is_some());
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_job_error() {
        let reaper = ExpiryReaper::new(Arc::new(BrokenStore), Arc::new(SystemClock));

        assert!(reaper.run().await.is_err());
    }
}
