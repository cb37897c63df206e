//! Errors - エラー型と分類
//!
//! - `ValidationError`: 呼び出し側の入力不正（リトライ無意味）
//! - `FragmentError::UnsupportedConversion`: 変換経路が存在しない
//! - `FragmentError::Storage`: バックエンドの障害（呼び出し側に伝播）
//!
//! "見つからない" はエラーではなく `Ok(None)` で表現します。

use thiserror::Error;

use crate::ports::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("owner id is required")]
    MissingOwnerId,

    #[error("fragment id is required")]
    MissingFragmentId,

    #[error("content type is required")]
    MissingType,

    #[error("content type {0} is not supported")]
    UnsupportedType(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// ErrorKind は境界層（HTTP など）向けの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unsupported,
    Infrastructure,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Unsupported => 415,
            ErrorKind::Infrastructure => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum FragmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cannot convert {fragment_type} to .{extension}")]
    UnsupportedConversion {
        fragment_type: String,
        extension: String,
    },

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl FragmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            // 作成時の型ゲートは 415 として扱う
            FragmentError::Validation(ValidationError::UnsupportedType(_)) => ErrorKind::Unsupported,
            FragmentError::Validation(_) => ErrorKind::Validation,
            FragmentError::UnsupportedConversion { .. } => ErrorKind::Unsupported,
            FragmentError::Storage(_) => ErrorKind::Infrastructure,
        }
    }
}
