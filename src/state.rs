use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::session::repo::SessionStore;
use crate::session::state::{reduce, Action, SessionState};
use crate::storage::{KvStore, MemoryKvStore, PgKvStore};
use crate::styling::client::{GeminiClient, StylingModel};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SessionStore,
    pub stylist: Arc<dyn StylingModel>,
    pub session: Arc<RwLock<SessionState>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let kv = match config.database_url.as_deref() {
            Some(url) => {
                let pg = PgKvStore::connect(url).await?;
                sqlx::migrate!("./migrations")
                    .run(pg.pool())
                    .await
                    .context("run database migrations")?;
                Arc::new(pg) as Arc<dyn KvStore>
            }
            None => {
                tracing::warn!("DATABASE_URL not set; sessions and history are kept in memory");
                Arc::new(MemoryKvStore::new()) as Arc<dyn KvStore>
            }
        };

        let stylist = Arc::new(GeminiClient::new(&config.gemini)?) as Arc<dyn StylingModel>;

        Self::from_parts(config, kv, stylist).await
    }

    pub async fn from_parts(
        config: Arc<AppConfig>,
        kv: Arc<dyn KvStore>,
        stylist: Arc<dyn StylingModel>,
    ) -> anyhow::Result<Self> {
        let store = SessionStore::new(kv, config.history_limit);
        let user = match store.load_user().await {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(error = %e, "stored session unreadable; starting signed out");
                None
            }
        };
        if let Some(u) = &user {
            tracing::info!(user_id = %u.id, "resuming stored session");
        }

        Ok(Self {
            config,
            store,
            stylist,
            session: Arc::new(RwLock::new(SessionState::restore(user))),
        })
    }

    /// Applies one transition to the shared session state.
    pub async fn dispatch(&self, action: Action) -> SessionState {
        let mut guard = self.session.write().await;
        let next = reduce(guard.clone(), action);
        tracing::debug!(view = ?next.view, "session transition");
        *guard = next.clone();
        next
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::config::{GeminiConfig, JwtConfig};
    use crate::styling::error::GenerationError;
    use crate::styling::types::{fixtures, StylingRequest, StylingResult};

    /// Model double: answers with the fixture advice or always fails.
    #[derive(Default)]
    pub struct FakeStylist {
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    impl FakeStylist {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StylingModel for FakeStylist {
        async fn generate(
            &self,
            request: &StylingRequest,
        ) -> Result<StylingResult, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GenerationError::Status {
                    status: 500,
                    message: "internal".into(),
                });
            }
            Ok(StylingResult::from_advice(fixtures::advice(), request))
        }
    }

    pub fn config() -> AppConfig {
        AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            gemini: GeminiConfig {
                api_key: None,
                model: "gemini-test".into(),
                api_base: "http://127.0.0.1:9".into(),
                timeout_secs: 1,
            },
            history_limit: 50,
        }
    }

    pub async fn state_with(stylist: Arc<FakeStylist>) -> AppState {
        state_with_kv(stylist, Arc::new(MemoryKvStore::new())).await
    }

    /// Like `state_with`, but the caller keeps a handle on the backing store.
    pub async fn state_with_kv(stylist: Arc<FakeStylist>, kv: Arc<MemoryKvStore>) -> AppState {
        AppState::from_parts(Arc::new(config()), kv, stylist as Arc<dyn StylingModel>)
            .await
            .unwrap()
    }

    pub async fn fake() -> AppState {
        state_with(Arc::new(FakeStylist::default())).await
    }
}
