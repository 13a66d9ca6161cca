use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// 服务端返回的结构化错误
    #[error("API error {status} ({kind}): {message}")]
    ApiError {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),
}

impl SdkError {
    /// HTTP 状态码, 仅对 API 错误有效
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
