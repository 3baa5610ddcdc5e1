//! Meeting session error types.
//!
//! Network failures arrive already normalized as [`GatewayError`] and have
//! been announced on the notice channel by the gateway. SDK and precondition
//! failures are local to the controller and only reach the user through the
//! controller's view, using [`SessionError::client_message`].

use crate::descriptor::DescriptorError;
use crate::gateway::GatewayError;
use crate::sdk::SdkError;
use std::fmt;
use thiserror::Error;

/// The SDK call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkStage {
    Preload,
    Init,
    Join,
}

impl fmt::Display for SdkStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SdkStage::Preload => "preload",
            SdkStage::Init => "init",
            SdkStage::Join => "join",
        })
    }
}

/// Why a meeting session could not be established.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// Required descriptor fields are missing. Reloading will not help.
    #[error("Precondition failed: {0}")]
    Precondition(#[from] DescriptorError),

    /// Credential or other backend request failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The conferencing client reported an error.
    #[error("SDK {stage} failed: {source}")]
    Sdk { stage: SdkStage, source: SdkError },
}

impl SessionError {
    pub fn sdk(stage: SdkStage, source: SdkError) -> Self {
        SessionError::Sdk { stage, source }
    }

    /// Whether a full reload may succeed.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            SessionError::Precondition(_) => false,
            SessionError::Gateway(_) | SessionError::Sdk { .. } => true,
        }
    }

    /// Backend or provider code, when there is one.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self {
            SessionError::Gateway(e) => Some(e.code),
            SessionError::Sdk { source, .. } => source.code,
            SessionError::Precondition(_) => None,
        }
    }

    /// Text for the blocking error view.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            SessionError::Precondition(_) => "缺少必要信息".to_string(),
            SessionError::Gateway(e) => e.message.clone(),
            SessionError::Sdk {
                stage: SdkStage::Preload,
                ..
            } => "初始化 Zoom 客户端失败".to_string(),
            SessionError::Sdk {
                stage: SdkStage::Init,
                source,
            } => format!("Zoom SDK 初始化失败: {}", source.reason),
            SessionError::Sdk {
                stage: SdkStage::Join,
                source,
            } => format!("加入会议失败: {}", source.reason),
        }
    }
}
