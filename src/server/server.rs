use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::server::*;
use crate::settings::Settings;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    reaper_handle: Mutex<Option<JoinHandle<()>>>,
    reaper_state: Arc<RunState>,
    cancel: CancellationToken,
    pool: Option<MySqlPool>,
}

fn seeded_credentials(settings: &Settings) -> MemoryCredentialVerifier {
    let verifier = MemoryCredentialVerifier::new();
    for user in &settings.store.users {
        verifier.insert(
            user.email.clone(),
            Principal {
                id: UserId(user.id),
                email_verified: user.email_verified,
            },
            user.password_hash.clone(),
        );
    }
    verifier
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let (session_store, credential_verifier, pool): (
            Arc<dyn RefreshSessionStore>,
            Arc<dyn CredentialVerifier>,
            Option<MySqlPool>,
        ) = match (settings.store.backend.as_str(), settings.store.dsn.as_deref()) {
            ("memory", _) => {
                warn!(
                    users = settings.store.users.len(),
                    "memory store backend: sessions do not survive restart"
                );
                (
                    Arc::new(MemorySessionStore::new()),
                    Arc::new(seeded_credentials(settings)),
                    None,
                )
            }
            ("mysql", Some(dsn)) => {
                let pool = MySqlPoolOptions::new().connect(dsn).await?;
                (
                    Arc::new(MySqlSessionStore::new(pool.clone())),
                    Arc::new(MySqlCredentialVerifier::new(pool.clone())),
                    Some(pool),
                )
            }
            ("mysql", None) => return Err(anyhow::anyhow!("store.dsn is required for mysql")),
            (other, _) => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtTokenIssuer::try_new(
            JwtConfig {
                access_secret: settings.auth.access_secret.expose().as_bytes().to_vec(),
                refresh_secret: settings.auth.refresh_secret.expose().as_bytes().to_vec(),
                access_ttl: settings.auth.access_ttl(),
                refresh_ttl: settings.auth.refresh_ttl(),
            },
            clock.clone(),
        )?);

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            credential_verifier,
            token_codec,
            session_store.clone(),
            clock.clone(),
            settings.auth.revoke_policy,
        ));

        // region runtime infra
        let cancel = CancellationToken::new();

        let reaper: Arc<dyn RecurringJob> =
            Arc::new(ExpiryReaper::new(session_store, clock.clone()));
        let scheduler = DailyScheduler::new(settings.reaper.sweep_at()?, clock, cancel.clone());
        let reaper_state = scheduler.state();
        let reaper_handle = scheduler.spawn(reaper);

        // endregion

        info!("server started");

        Ok(Self {
            auth_service,
            reaper_handle: Mutex::new(Some(reaper_handle)),
            reaper_state,
            cancel,
            pool,
        })
    }

    /// Start time of the expiry sweep currently running, if any.
    pub fn sweep_running_since(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.reaper_state.running_since()
    }

    /// Stops the reaper after any in-flight sweep, then closes the pool.
    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = self.reaper_handle.lock().ok().and_then(|mut lock| lock.take());
        if let Some(handle) = handle {
            let r = handle.await;
            info!("reaper handle dropped: {:?}", r);
        }

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
