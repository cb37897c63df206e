//! Response - 境界層向けのレスポンス封筒
//!
//! 成功: `{"status":"ok", ...payload}`
//! 失敗: `{"status":"error","error":{"code":N,"message":"..."}}`

use serde::{Deserialize, Serialize};

use super::errors::FragmentError;

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    status: &'static str,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(body: T) -> Self {
        Self { status: "ok", body }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }
}

impl From<&FragmentError> for ErrorResponse {
    fn from(err: &FragmentError) -> Self {
        Self::new(err.kind().status_code(), err.to_string())
    }
}
