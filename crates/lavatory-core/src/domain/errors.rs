//! Errors - エラー型と分類
//!
//! # 分類
//! - Input: 呼び出し側の入力ミス（ポリシー指定の誤りなど）。即座に中断する
//! - Transport: サーバーに届かなかった、またはレスポンスを読めなかった
//! - Server: サーバーが非 2xx を返した

use thiserror::Error;

/// ErrorKind はエラーの運用分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Transport,
    Server,
}

/// LavatoryError は core 全体で使うエラー型
#[derive(Debug, Error)]
pub enum LavatoryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("server returned {status} for {url}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("malformed query: {0}")]
    Query(String),

    #[error("config: {0}")]
    Config(String),
}

impl LavatoryError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::Query(_) | Self::Config(_) => ErrorKind::Input,
            Self::Transport { .. } | Self::Decode(_) => ErrorKind::Transport,
            Self::Status { .. } => ErrorKind::Server,
        }
    }
}

impl From<serde_json::Error> for LavatoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classifies_variants() {
        assert_eq!(
            LavatoryError::invalid_argument("x").kind(),
            ErrorKind::Input
        );
        assert_eq!(
            LavatoryError::Status {
                url: "u".into(),
                status: 404,
                body: String::new(),
            }
            .kind(),
            ErrorKind::Server
        );
        assert_eq!(LavatoryError::Decode("bad".into()).kind(), ErrorKind::Transport);
    }

    #[test]
    fn status_error_mentions_url_and_code() {
        let err = LavatoryError::Status {
            url: "https://repo/api/storageinfo".into(),
            status: 503,
            body: "down".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("api/storageinfo"));
    }
}
