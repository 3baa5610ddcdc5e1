//! Capability interface over the embedded conferencing client.
//!
//! The provider's client is callback based: `init` and `join` report through
//! success/error callbacks and in-meeting state arrives through named
//! listeners. Here each call resolves as a future and listeners are plain
//! closures, so the controller can drive it as an ordinary async state
//! machine.
//!
//! The provider's behaviour is opaque. Nothing in this layer adds timeouts:
//! a client that never answers leaves the controller waiting.

pub mod mock;

use common::secret::SecretString;
use common::types::UserId;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// `meetingStatus` value the provider emits when the meeting has ended.
pub const MEETING_STATUS_ENDED: i32 = 3;

/// Error reported by the provider's client. The shape is provider-defined;
/// only the optional code and reason text are kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct SdkError {
    pub code: Option<i32>,
    pub reason: String,
}

impl SdkError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            code: None,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
}

/// Options for the client's `init` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOptions {
    /// Where the client sends the user when they leave from its own UI.
    pub leave_url: String,
    pub patch_js_media: bool,
    pub leave_on_page_unload: bool,
}

impl InitOptions {
    pub fn new(leave_url: impl Into<String>) -> Self {
        Self {
            leave_url: leave_url.into(),
            patch_js_media: true,
            leave_on_page_unload: true,
        }
    }
}

/// Parameters for the client's `join` call.
#[derive(Clone)]
pub struct JoinParams {
    pub signature: SecretString,
    pub sdk_key: String,
    /// Meeting number with whitespace removed.
    pub meeting_number: String,
    pub pass_word: SecretString,
    pub user_name: String,
    pub user_email: String,
    /// Registrant token; empty when the meeting has no registration.
    pub tk: SecretString,
    /// Host zak token; empty when joining as attendee.
    pub zak: SecretString,
}

impl fmt::Debug for JoinParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinParams")
            .field("signature", &"[REDACTED]")
            .field("sdk_key", &self.sdk_key)
            .field("meeting_number", &self.meeting_number)
            .field("pass_word", &"[REDACTED]")
            .field("user_name", &self.user_name)
            .field("user_email", &self.user_email)
            .field("tk", &"[REDACTED]")
            .field("zak", &"[REDACTED]")
            .finish()
    }
}

/// The local participant as the client reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkUser {
    pub user_id: UserId,
    pub user_name: String,
}

/// Listener names the controller subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkEventKind {
    MeetingStatus,
    UserLeave,
}

impl SdkEventKind {
    /// Listener name used by the provider.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SdkEventKind::MeetingStatus => "onMeetingStatus",
            SdkEventKind::UserLeave => "onUserLeave",
        }
    }
}

/// In-meeting event delivered to a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkEvent {
    /// Meeting status changed. [`MEETING_STATUS_ENDED`] means the meeting is over.
    MeetingStatus { status: i32 },
    /// A participant left the meeting.
    UserLeave { user_id: UserId },
}

impl SdkEvent {
    #[must_use]
    pub fn kind(&self) -> SdkEventKind {
        match self {
            SdkEvent::MeetingStatus { .. } => SdkEventKind::MeetingStatus,
            SdkEvent::UserLeave { .. } => SdkEventKind::UserLeave,
        }
    }
}

/// Callback invoked by the client for each event of the subscribed kind.
pub type SdkEventListener = Arc<dyn Fn(SdkEvent) + Send + Sync>;

/// The embedded conferencing client.
#[async_trait::async_trait]
pub trait ConferencingSdk: Send + Sync {
    /// Load the client's assets and the UI language pack for `locale`.
    async fn preload(&self, locale: &str) -> Result<(), SdkError>;

    /// Initialize the client. Resolves when the provider calls back.
    async fn init(&self, options: InitOptions) -> Result<(), SdkError>;

    /// Join a meeting. Resolves when the provider calls back.
    async fn join(&self, params: JoinParams) -> Result<(), SdkError>;

    /// Ask the client who the local participant is. `None` while unresolved.
    async fn current_user(&self) -> Result<Option<SdkUser>, SdkError>;

    /// Subscribe `listener` to events of `kind`.
    fn on_event(&self, kind: SdkEventKind, listener: SdkEventListener);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_options_defaults() {
        let options = InitOptions::new("http://localhost:5173/leave");

        assert!(options.patch_js_media);
        assert!(options.leave_on_page_unload);
    }

    #[test]
    fn test_event_kind_names() {
        assert_eq!(
            SdkEvent::MeetingStatus { status: 3 }.kind().as_str(),
            "onMeetingStatus"
        );
        assert_eq!(
            SdkEvent::UserLeave { user_id: UserId(1) }.kind().as_str(),
            "onUserLeave"
        );
    }

    #[test]
    fn test_join_params_debug_redacts() {
        let params = JoinParams {
            signature: SecretString::from("sig-secret"),
            sdk_key: "key".to_string(),
            meeting_number: "123".to_string(),
            pass_word: SecretString::from("pw-secret"),
            user_name: "Alice".to_string(),
            user_email: String::new(),
            tk: SecretString::from(""),
            zak: SecretString::from("zak-secret"),
        };
        let rendered = format!("{params:?}");

        assert!(!rendered.contains("sig-secret"));
        assert!(!rendered.contains("pw-secret"));
        assert!(!rendered.contains("zak-secret"));
    }
}
