//! Normalized gateway failure and the status message table.
//!
//! Every network failure the rest of the crate observes is a [`GatewayError`].
//! The classification order is fixed: transport, then HTTP status, then the
//! envelope's business flag.

use std::borrow::Cow;
use thiserror::Error;

/// Code used when no HTTP status is available (network error, unreadable body).
pub const TRANSPORT_FAILURE_CODE: i32 = 500;

/// Title attached to every notice raised by the gateway.
pub const REQUEST_FAILED_TITLE: &str = "请求失败";

/// Display text for transport failures.
pub const NETWORK_FAILURE_MESSAGE: &str = "网络连接失败，请检查网络设置";

/// Display text for a success status whose body is not a readable envelope.
pub const MALFORMED_RESPONSE_MESSAGE: &str = "响应数据格式错误";

/// Which step of the classification produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request threw before a response arrived.
    Transport,
    /// A response arrived with a non-2xx status.
    Http,
    /// The envelope arrived with `success = false`.
    Business,
    /// A 2xx response whose body could not be decoded.
    MalformedResponse,
}

impl FailureKind {
    /// Label value for metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Http => "http",
            FailureKind::Business => "business",
            FailureKind::MalformedResponse => "malformed_response",
        }
    }
}

/// Normalized failure of a gateway request.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message} (code {code})")]
pub struct GatewayError {
    /// HTTP status, envelope business code, or [`TRANSPORT_FAILURE_CODE`].
    pub code: i32,
    /// Display message.
    pub message: String,
    /// Raw envelope payload, only for business failures.
    pub data: Option<serde_json::Value>,
    /// Classification step.
    pub kind: FailureKind,
}

impl GatewayError {
    /// Network unreachable, timeout, or any error raised before a response.
    #[must_use]
    pub fn transport() -> Self {
        Self {
            code: TRANSPORT_FAILURE_CODE,
            message: NETWORK_FAILURE_MESSAGE.to_string(),
            data: None,
            kind: FailureKind::Transport,
        }
    }

    /// Non-success HTTP status.
    #[must_use]
    pub fn http(status: u16) -> Self {
        Self {
            code: i32::from(status),
            message: status_message(status).into_owned(),
            data: None,
            kind: FailureKind::Http,
        }
    }

    /// Envelope reported `success = false`.
    #[must_use]
    pub fn business(code: i32, message: String, data: Option<serde_json::Value>) -> Self {
        Self {
            code,
            message,
            data,
            kind: FailureKind::Business,
        }
    }

    /// 2xx response that is not a decodable envelope, or a payload that does
    /// not match the caller's expected shape.
    #[must_use]
    pub fn malformed_response() -> Self {
        Self {
            code: TRANSPORT_FAILURE_CODE,
            message: MALFORMED_RESPONSE_MESSAGE.to_string(),
            data: None,
            kind: FailureKind::MalformedResponse,
        }
    }
}

/// Display message for a non-success HTTP status.
///
/// Unmapped statuses fall back to a template containing the number.
#[must_use]
pub fn status_message(status: u16) -> Cow<'static, str> {
    let message = match status {
        400 => "请求参数错误",
        401 => "未授权，请重新登录",
        403 => "没有权限访问该资源",
        404 => "请求的资源不存在",
        408 => "请求超时，请稍后重试",
        409 => "请求冲突，资源状态已变更",
        422 => "请求数据校验失败",
        429 => "请求过于频繁，请稍后重试",
        500 => "服务器内部错误",
        502 => "网关错误",
        503 => "服务暂时不可用，请稍后重试",
        504 => "网关超时",
        _ => return Cow::Owned(format!("请求失败 (HTTP {status})")),
    };
    Cow::Borrowed(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const MAPPED: [u16; 12] = [400, 401, 403, 404, 408, 409, 422, 429, 500, 502, 503, 504];

    #[test]
    fn test_every_mapped_status_has_a_distinct_message() {
        let mut seen = HashSet::new();
        for status in MAPPED {
            let message = status_message(status);
            assert!(!message.is_empty(), "empty message for {status}");
            assert!(
                !message.contains("HTTP"),
                "{status} fell through to the template"
            );
            assert!(seen.insert(message.into_owned()), "duplicate message for {status}");
        }
    }

    #[test]
    fn test_unmapped_status_uses_template() {
        for status in [402, 418, 501, 599, 302] {
            assert!(status_message(status).contains(&status.to_string()));
        }
    }

    #[test]
    fn test_http_error_carries_status() {
        let error = GatewayError::http(503);
        assert_eq!(error.code, 503);
        assert_eq!(error.kind, FailureKind::Http);
        assert_eq!(error.message, status_message(503));
    }

    #[test]
    fn test_transport_error_shape() {
        let error = GatewayError::transport();
        assert_eq!(error.code, TRANSPORT_FAILURE_CODE);
        assert_eq!(error.message, NETWORK_FAILURE_MESSAGE);
        assert!(error.data.is_none());
    }

    #[test]
    fn test_display_includes_code() {
        let error = GatewayError::business(4001, "会议不存在".to_string(), None);
        assert_eq!(error.to_string(), "会议不存在 (code 4001)");
    }
}
