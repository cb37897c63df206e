//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryKeyedStore**: プロセス寿命の間だけ保持するストア
//!
//! 永続ストアは `KeyedStore` を実装すれば Fragment 側の変更なしに差し替えられます。

pub mod inmem_store;

pub use self::inmem_store::InMemoryKeyedStore;
