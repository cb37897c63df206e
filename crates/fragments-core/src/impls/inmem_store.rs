//! InMemoryKeyedStore - プロセス寿命の間だけ保持するストア
//!
//! # 実装詳細
//! - `HashMap<namespace, HashMap<key, bytes>>` で namespace ごとに分離
//! - `tokio::sync::RwLock` で排他制御（put/delete は書き込みロック内で完結）
//! - 読み手は部分的に書かれた値を観測しない

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{KeyedStore, StoreError};

type Namespaces = HashMap<String, HashMap<String, Vec<u8>>>;

#[derive(Clone, Default)]
pub struct InMemoryKeyedStore {
    namespaces: Arc<RwLock<Namespaces>>,
}

impl InMemoryKeyedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of keys across all namespaces.
    pub async fn len(&self) -> usize {
        let namespaces = self.namespaces.read().await;
        namespaces.values().map(HashMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyedStore for InMemoryKeyedStore {
    async fn put(&self, namespace: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut namespaces = self.namespaces.write().await;
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn query(&self, namespace: &str) -> Result<Vec<Vec<u8>>, StoreError> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces
            .get(namespace)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StoreError> {
        let mut namespaces = self.namespaces.write().await;
        let Some(entries) = namespaces.get_mut(namespace) else {
            return Ok(false);
        };
        let removed = entries.remove(key).is_some();
        if entries.is_empty() {
            namespaces.remove(namespace);
        }
        Ok(removed)
    }
}
