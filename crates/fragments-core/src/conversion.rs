//! ConversionEngine - 読み出し時の表現変換
//!
//! `(保存された media type, 要求された拡張子)` をキーにした表から
//! 純粋関数（bytes -> bytes + content type）を引きます。
//! 新しい組み合わせの追加は `register` を呼ぶだけで、分岐は増えません。
//!
//! # 状態遷移（1 リクエストにつき 1 回）
//! - 拡張子なし: RawOutput（保存された type のまま返す）
//! - 拡張子あり & 表にある: ConvertedOutput
//! - 拡張子あり & 表にない: Rejected（`UnsupportedConversion`）

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use pulldown_cmark::{Parser, html};

use crate::domain::FragmentError;
use crate::domain::media_type;

/// Bytes plus the content type they should be served as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl Converted {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }
}

/// A pure conversion from stored payload bytes to another representation.
pub type Converter = Arc<dyn Fn(&[u8]) -> Converted + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("conversion from {source_type} to .{extension} is already registered")]
    AlreadyRegistered {
        source_type: String,
        extension: String,
    },
}

pub struct ConversionEngine {
    /// 作成を受け付ける media type（パラメータなし、小文字）
    supported_types: Vec<String>,
    conversions: HashMap<(String, String), Converter>,
}

impl ConversionEngine {
    /// An engine with no conversions that accepts the given types for creation.
    pub fn empty(supported_types: &[String]) -> Self {
        Self {
            supported_types: supported_types.iter().map(|t| media_type::essence(t)).collect(),
            conversions: HashMap::new(),
        }
    }

    /// The built-in table: Markdown to HTML and Markdown to plain text.
    pub fn new(supported_types: &[String]) -> Self {
        let mut engine = Self::empty(supported_types);
        engine.conversions.insert(
            ("text/markdown".to_string(), "html".to_string()),
            Arc::new(markdown_to_html),
        );
        engine.conversions.insert(
            ("text/markdown".to_string(), "txt".to_string()),
            Arc::new(|bytes: &[u8]| Converted::new(bytes.to_vec(), "text/plain")),
        );
        engine
    }

    /// Keep the conversion table, replace the creation gate.
    pub fn with_supported_types(mut self, supported_types: &[String]) -> Self {
        self.supported_types = supported_types.iter().map(|t| media_type::essence(t)).collect();
        self
    }

    pub fn register(
        &mut self,
        source_type: &str,
        extension: &str,
        converter: Converter,
    ) -> Result<(), RegistryError> {
        let key = (
            media_type::essence(source_type),
            extension.to_ascii_lowercase(),
        );
        if self.conversions.contains_key(&key) {
            return Err(RegistryError::AlreadyRegistered {
                source_type: key.0,
                extension: key.1,
            });
        }
        self.conversions.insert(key, converter);
        Ok(())
    }

    /// Gate for new fragments. Parameters are ignored: `text/plain; charset=utf-8` passes.
    pub fn is_supported_type(&self, candidate: &str) -> bool {
        let essence = media_type::essence(candidate);
        !essence.is_empty() && self.supported_types.iter().any(|t| *t == essence)
    }

    /// Extensions a fragment of `fragment_type` can be requested with.
    pub fn extensions_for(&self, fragment_type: &str) -> Vec<&str> {
        let essence = media_type::essence(fragment_type);
        let mut exts: Vec<&str> = self
            .conversions
            .keys()
            .filter(|(source, _)| *source == essence)
            .map(|(_, ext)| ext.as_str())
            .collect();
        exts.sort_unstable();
        exts
    }

    /// Resolve what to return for a stored payload and an optional requested extension.
    pub fn convert(
        &self,
        fragment_type: &str,
        data: Vec<u8>,
        extension: Option<&str>,
    ) -> Result<Converted, FragmentError> {
        let Some(extension) = extension else {
            return Ok(Converted::new(data, fragment_type));
        };

        let key = (
            media_type::essence(fragment_type),
            extension.to_ascii_lowercase(),
        );
        match self.conversions.get(&key) {
            Some(converter) => Ok(converter(&data)),
            None => Err(FragmentError::UnsupportedConversion {
                fragment_type: fragment_type.to_string(),
                extension: extension.to_string(),
            }),
        }
    }
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::new(&["text/plain".to_string()])
    }
}

impl fmt::Debug for ConversionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<_> = self.conversions.keys().collect();
        pairs.sort();
        f.debug_struct("ConversionEngine")
            .field("supported_types", &self.supported_types)
            .field("conversions", &pairs)
            .finish()
    }
}

fn markdown_to_html(bytes: &[u8]) -> Converted {
    let text = String::from_utf8_lossy(bytes);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new(&text));
    Converted::new(out.into_bytes(), "text/html")
}

/// Split a trailing `.ext` off a resource path segment: `abc.html` -> (`abc`, Some(`html`)).
///
/// Splits at the last dot. A dot that would leave either side empty is not an extension.
pub fn split_extension(raw: &str) -> (&str, Option<String>) {
    match raw.rsplit_once('.') {
        Some((id, ext)) if !id.is_empty() && !ext.is_empty() => {
            (id, Some(ext.to_ascii_lowercase()))
        }
        _ => (raw, None),
    }
}
