use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::dto::User;
use crate::storage::KvStore;
use crate::styling::types::StylingResult;

pub const USER_KEY: &str = "styleai_user";

pub fn history_key(user_id: Uuid) -> String {
    format!("history_{}", user_id)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[from] anyhow::Error),

    #[error("corrupt record under key {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Typed view over the key-value store: one session slot plus per-user history.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
    history_limit: usize,
    // Serializes the read-modify-write in `append_history` within this process.
    append_lock: Arc<Mutex<()>>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>, history_limit: usize) -> Self {
        Self {
            kv,
            history_limit: history_limit.max(1),
            append_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| {
                warn!(key, error = %source, "corrupt record in store");
                StoreError::Decode {
                    key: key.to_string(),
                    source,
                }
            })
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(StoreError::Encode)?;
        self.kv.put(key, raw).await?;
        Ok(())
    }

    pub async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.write(USER_KEY, user).await?;
        debug!(user_id = %user.id, "session user saved");
        Ok(())
    }

    pub async fn load_user(&self) -> Result<Option<User>, StoreError> {
        self.read(USER_KEY).await
    }

    pub async fn clear_user(&self) -> Result<(), StoreError> {
        self.kv.delete(USER_KEY).await?;
        Ok(())
    }

    /// Prepends `result`, newest first, and trims to the retention limit.
    pub async fn append_history(
        &self,
        user_id: Uuid,
        result: &StylingResult,
    ) -> Result<usize, StoreError> {
        let _guard = self.append_lock.lock().await;
        let key = history_key(user_id);
        let mut history: Vec<StylingResult> = self.read(&key).await?.unwrap_or_default();
        history.insert(0, result.clone());
        history.truncate(self.history_limit);
        self.write(&key, &history).await?;
        debug!(%user_id, result_id = %result.id, len = history.len(), "history appended");
        Ok(history.len())
    }

    pub async fn load_history(&self, user_id: Uuid) -> Result<Vec<StylingResult>, StoreError> {
        Ok(self.read(&history_key(user_id)).await?.unwrap_or_default())
    }

    pub async fn find_history_entry(
        &self,
        user_id: Uuid,
        result_id: Uuid,
    ) -> Result<Option<StylingResult>, StoreError> {
        Ok(self
            .load_history(user_id)
            .await?
            .into_iter()
            .find(|r| r.id == result_id))
    }
}
