//! Web 层错误
//!
//! 分发错误按来源映射到状态码：请求体或实参解码失败属于客户端错误（400），
//! 其余（控制器返回的错误、序列化失败、实例不匹配）均为 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hexagon_core::{BindError, DispatchError};
use serde::Serialize;
use thiserror::Error;

/// Web 层错误类型
#[derive(Error, Debug)]
pub enum WebError {
    /// 请求分发失败
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// 路由绑定失败
    #[error("Failed to bind routes: {0}")]
    Bind(#[from] BindError),

    /// 服务器监听或运行失败
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl WebError {
    /// 获取错误对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::Dispatch(e) if e.is_decode_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 转换为带请求路径的错误响应
    pub fn to_error_response(&self, path: impl Into<String>) -> ErrorResponse {
        ErrorResponse::new(self.status_code(), self.to_string()).with_path(path)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        ErrorResponse::new(self.status_code(), self.to_string()).into_response()
    }
}

/// 标准错误响应格式
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_decode_error() -> DispatchError {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        DispatchError::BodyDecode(source)
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            WebError::from(body_decode_error()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::from(DispatchError::Invocation(anyhow::anyhow!("boom"))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebError::from(DispatchError::MissingHandle).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_shape() {
        let response = WebError::from(DispatchError::Invocation(anyhow::anyhow!("boom")))
            .to_error_response("/users/1");

        assert_eq!(response.status, 500);
        assert_eq!(response.error, "Internal Server Error");
        assert_eq!(response.message, "boom");
        assert_eq!(response.path.as_deref(), Some("/users/1"));
    }
}
