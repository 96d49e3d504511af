use crate::{DynamoDbStateStore, FileStateStore};
use anyhow::Result;
use std::future::Future;

/// Key-value store that survives process restarts.
pub trait StateStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Store selected at startup from configuration.
pub enum StateBackend {
    File(FileStateStore),
    DynamoDb(DynamoDbStateStore),
}

impl StateStore for StateBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            StateBackend::File(store) => store.get(key).await,
            StateBackend::DynamoDb(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        match self {
            StateBackend::File(store) => store.set(key, value).await,
            StateBackend::DynamoDb(store) => store.set(key, value).await,
        }
    }
}
