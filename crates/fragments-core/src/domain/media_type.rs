//! Media type - MIME type の補助関数
//!
//! Fragment は作成時の `Content-Type` 文字列をパラメータ込みでそのまま保持し、
//! 判定はパラメータを除いた media type で行います。

/// Strip parameters from a content type: `text/markdown; charset=utf-8` -> `text/markdown`.
///
/// The result is trimmed and lower-cased, since media types compare case-insensitively.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// True for any `text/*` media type.
pub fn is_text(content_type: &str) -> bool {
    essence(content_type).starts_with("text/")
}
