//! The outer wrapper around every server response.

use super::error::GatewayError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server response envelope.
///
/// `success` is independent of the HTTP status: a 200 response may still
/// carry a business failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// 200 on success, otherwise a business error code.
    pub code: i32,
    /// Canonical display string.
    #[serde(default)]
    pub message: String,
    /// Payload; may be absent on failure.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Whether the request succeeded.
    pub success: bool,
}

impl ApiEnvelope<Value> {
    /// Unwrap the payload or produce the business failure.
    ///
    /// A missing payload on success decodes as JSON `null`, so callers
    /// expecting `()` or `Option<_>` are satisfied.
    ///
    /// # Errors
    ///
    /// - Business failure when `success` is false.
    /// - Malformed response when the payload does not decode as `T`.
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<T, GatewayError> {
        if !self.success {
            return Err(GatewayError::business(self.code, self.message, self.data));
        }

        serde_json::from_value(self.data.unwrap_or(Value::Null)).map_err(|e| {
            tracing::warn!(target: "ms.gateway", error = %e, "Envelope payload has unexpected shape");
            GatewayError::malformed_response()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::gateway::error::FailureKind;
    use serde_json::json;

    fn envelope(value: Value) -> ApiEnvelope<Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_success_returns_payload_only() {
        let env = envelope(json!({
            "code": 200, "message": "操作成功", "success": true,
            "data": {"signature": "sig"}
        }));

        let payload: Value = env.into_payload().unwrap();
        assert_eq!(payload, json!({"signature": "sig"}));
    }

    #[test]
    fn test_failure_keeps_code_message_and_data() {
        let env = envelope(json!({
            "code": 4003, "message": "会议已结束", "success": false,
            "data": {"meeting": "123"}
        }));

        let error = env.into_payload::<Value>().unwrap_err();
        assert_eq!(error.code, 4003);
        assert_eq!(error.message, "会议已结束");
        assert_eq!(error.data, Some(json!({"meeting": "123"})));
        assert_eq!(error.kind, FailureKind::Business);
    }

    #[test]
    fn test_failure_without_data() {
        let env = envelope(json!({"code": 401, "message": "未登录", "success": false}));
        let error = env.into_payload::<Value>().unwrap_err();
        assert!(error.data.is_none());
    }

    #[test]
    fn test_missing_payload_decodes_as_unit() {
        let env = envelope(json!({"code": 200, "message": "", "success": true}));
        env.into_payload::<()>().unwrap();
    }

    #[test]
    fn test_wrong_payload_shape_is_malformed() {
        #[derive(Debug, Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            signature: String,
        }

        let env = envelope(json!({"code": 200, "success": true, "data": {"other": 1}}));
        let error = env.into_payload::<Expected>().unwrap_err();
        assert_eq!(error.kind, FailureKind::MalformedResponse);
    }
}
