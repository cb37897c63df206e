//! KeyedStore port - `(namespace, key) -> bytes` の二段キーストア
//!
//! メタデータ用とペイロード用の 2 つの独立したインスタンスが
//! システムを支えます。namespace は ownerId、key は fragmentId です。
//!
//! # 実装
//! - **InMemoryKeyedStore**: プロセス寿命の間だけ保持（`impls::inmem_store`）

use async_trait::async_trait;
use thiserror::Error;

/// StoreError はバックエンド自体の障害
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt value at {namespace}/{key}: {reason}")]
    Corrupt {
        namespace: String,
        key: String,
        reason: String,
    },
}

/// KeyedStore は namespace ごとに値を保持する
///
/// # 契約
/// - `put` は upsert。呼び出し完了後にのみ読み手から見える（部分適用なし）
/// - `get` の「なし」はエラーではない
/// - `query` は順序を保証しない。該当なしなら空
/// - `delete` は削除したら true、キーが無ければ false
/// - ある namespace への操作が別の namespace のキーに影響してはならない
#[async_trait]
pub trait KeyedStore: Send + Sync {
    async fn put(&self, namespace: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn query(&self, namespace: &str) -> Result<Vec<Vec<u8>>, StoreError>;

    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StoreError>;
}
