//! FragmentsBuilder - ストア・時計・ID 生成器・変換表のワイヤリング
//!
//! # Fail-fast 設計
//! - 設定の `supported_types` に空や不正な値があれば build() で拒否
//! - 未指定のストアは InMemoryKeyedStore、時計は SystemClock で補う

use std::sync::Arc;

use crate::app::Fragments;
use crate::config::FragmentsConfig;
use crate::conversion::ConversionEngine;
use crate::domain::media_type;
use crate::fragment::FragmentContext;
use crate::impls::InMemoryKeyedStore;
use crate::ports::{Clock, IdGenerator, KeyedStore, SystemClock, UlidGenerator};
use crate::repository::FragmentRepository;

/// BuildError は構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid supported type {0:?}: expected type/subtype")]
    InvalidSupportedType(String),

    #[error("max_payload_bytes must be greater than zero")]
    ZeroPayloadLimit,
}

/// # 使用例
/// ```ignore
/// let fragments = FragmentsBuilder::new()
///     .config(FragmentsConfig::default())
///     .build()?;
/// ```
#[derive(Default)]
pub struct FragmentsBuilder {
    config: FragmentsConfig,
    metadata: Option<Arc<dyn KeyedStore>>,
    data: Option<Arc<dyn KeyedStore>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    engine: Option<ConversionEngine>,
}

impl FragmentsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: FragmentsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn metadata_store(mut self, store: Arc<dyn KeyedStore>) -> Self {
        self.metadata = Some(store);
        self
    }

    pub fn data_store(mut self, store: Arc<dyn KeyedStore>) -> Self {
        self.data = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Replace the conversion table. Its type gate is rebuilt from the config on `build`.
    pub fn conversions(mut self, engine: ConversionEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn build(self) -> Result<Fragments, BuildError> {
        for t in &self.config.supported_types {
            let essence = media_type::essence(t);
            let valid = essence
                .split_once('/')
                .is_some_and(|(top, sub)| !top.is_empty() && !sub.is_empty());
            if !valid {
                return Err(BuildError::InvalidSupportedType(t.clone()));
            }
        }
        if self.config.max_payload_bytes == 0 {
            return Err(BuildError::ZeroPayloadLimit);
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(clock.clone())));
        let metadata = self
            .metadata
            .unwrap_or_else(|| Arc::new(InMemoryKeyedStore::new()));
        let data = self
            .data
            .unwrap_or_else(|| Arc::new(InMemoryKeyedStore::new()));
        let engine = match self.engine {
            Some(engine) => engine.with_supported_types(&self.config.supported_types),
            None => ConversionEngine::new(&self.config.supported_types),
        };

        let ctx = FragmentContext::new(
            FragmentRepository::new(metadata, data),
            clock,
            ids,
            Arc::new(engine),
        );
        Ok(Fragments::new(ctx, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_with_defaults() {
        let fragments = FragmentsBuilder::new().build().unwrap();
        assert!(fragments.engine().is_supported_type("text/plain"));
        assert!(!fragments.engine().is_supported_type("text/markdown"));
    }

    #[test]
    fn build_applies_configured_types() {
        let config = FragmentsConfig {
            supported_types: vec!["text/plain".into(), "text/markdown".into()],
            ..FragmentsConfig::default()
        };
        let fragments = FragmentsBuilder::new().config(config).build().unwrap();
        assert!(fragments.engine().is_supported_type("text/markdown; charset=utf-8"));
    }

    #[test]
    fn build_rejects_malformed_types() {
        for bad in ["", "text", "text/", "/plain"] {
            let config = FragmentsConfig {
                supported_types: vec![bad.into()],
                ..FragmentsConfig::default()
            };
            let result = FragmentsBuilder::new().config(config).build();
            assert!(
                matches!(result, Err(BuildError::InvalidSupportedType(ref t)) if t == bad),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn build_rejects_zero_payload_limit() {
        let config = FragmentsConfig {
            max_payload_bytes: 0,
            ..FragmentsConfig::default()
        };
        assert!(matches!(
            FragmentsBuilder::new().config(config).build(),
            Err(BuildError::ZeroPayloadLimit)
        ));
    }

    #[test]
    fn custom_conversions_take_the_configured_gate() {
        let engine = ConversionEngine::empty(&["image/png".to_string()]);
        let fragments = FragmentsBuilder::new().conversions(engine).build().unwrap();

        assert!(fragments.engine().is_supported_type("text/plain"));
        assert!(!fragments.engine().is_supported_type("image/png"));
        assert!(fragments.engine().extensions_for("text/markdown").is_empty());
    }
}
