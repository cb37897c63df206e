//! Config - fragment サービスの設定
//!
//! 全フィールドにデフォルトがあるので、一部だけ（あるいは空）の JSON でも有効です。

use serde::{Deserialize, Serialize};

/// 5 MiB, the raw-body limit the HTTP layer has always applied.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentsConfig {
    /// Media types accepted when creating a fragment.
    pub supported_types: Vec<String>,

    /// Largest payload the boundary layer should hand to the core.
    pub max_payload_bytes: usize,
}

impl Default for FragmentsConfig {
    fn default() -> Self {
        Self {
            supported_types: vec!["text/plain".to_string()],
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl FragmentsConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_reasonable() {
        let c = FragmentsConfig::default();
        assert_eq!(c.supported_types, vec!["text/plain".to_string()]);
        assert_eq!(c.max_payload_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let c = FragmentsConfig::from_json_str(r#"{ "max_payload_bytes": 16 }"#).unwrap();
        assert_eq!(c.max_payload_bytes, 16);
        assert_eq!(c.supported_types, vec!["text/plain".to_string()]);

        let c = FragmentsConfig::from_json_str("{}").unwrap();
        assert_eq!(c, FragmentsConfig::default());
    }

    #[test]
    fn supported_types_can_be_extended() {
        let c = FragmentsConfig::from_json_str(
            r#"{ "supported_types": ["text/plain", "text/markdown"] }"#,
        )
        .unwrap();
        assert_eq!(c.supported_types.len(), 2);
        assert_eq!(c.max_payload_bytes, DEFAULT_MAX_PAYLOAD_BYTES);
    }
}
