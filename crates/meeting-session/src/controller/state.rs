//! Controller state as observed from outside.

use crate::errors::SessionError;

/// Lifecycle of one mounted controller.
///
/// `Idle → Initializing → Joining → Active → Terminating → Terminated`.
/// Failures before `Active` go straight to `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionLifecycleState {
    Idle,
    /// Loading the conferencing client.
    Initializing,
    /// Fetching the join credential and initializing the client.
    Joining,
    /// Client initialized; joining or in the meeting.
    Active,
    /// Teardown in progress.
    Terminating,
    Terminated,
}

impl SessionLifecycleState {
    /// `Terminating` or `Terminated`: no further transitions are accepted.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionLifecycleState::Terminating | SessionLifecycleState::Terminated
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionLifecycleState::Idle => "idle",
            SessionLifecycleState::Initializing => "initializing",
            SessionLifecycleState::Joining => "joining",
            SessionLifecycleState::Active => "active",
            SessionLifecycleState::Terminating => "terminating",
            SessionLifecycleState::Terminated => "terminated",
        }
    }
}

impl std::fmt::Display for SessionLifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error shown in the blocking error view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewError {
    pub message: String,
    /// Backend or provider code, if any.
    pub code: Option<i32>,
    /// Whether reloading the page may succeed.
    pub retriable: bool,
}

impl From<&SessionError> for ViewError {
    fn from(error: &SessionError) -> Self {
        Self {
            message: error.client_message(),
            code: error.code(),
            retriable: error.is_retriable(),
        }
    }
}

/// Why a controller reached `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// No descriptor was stored; sent to the join screen.
    NoSession,
    /// A failure before `Active`; see the view's error.
    Failed,
    /// The user asked to leave.
    LeaveRequested,
    /// The meeting screen was unmounted.
    Unmount,
    /// The page is unloading.
    PageUnload,
    /// The provider reported the meeting ended.
    MeetingEnded,
    /// The provider reported the local participant left.
    LocalUserLeft,
}

impl TerminationReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TerminationReason::NoSession => "no_session",
            TerminationReason::Failed => "failed",
            TerminationReason::LeaveRequested => "leave_requested",
            TerminationReason::Unmount => "unmount",
            TerminationReason::PageUnload => "page_unload",
            TerminationReason::MeetingEnded => "meeting_ended",
            TerminationReason::LocalUserLeft => "local_user_left",
        }
    }
}

/// What the meeting screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerView {
    pub state: SessionLifecycleState,
    /// Loading indicator; cleared once the join succeeds or fails.
    pub loading: bool,
    pub error: Option<ViewError>,
    /// Set once `Terminated` is reached.
    pub termination: Option<TerminationReason>,
}

impl Default for ControllerView {
    fn default() -> Self {
        Self {
            state: SessionLifecycleState::Idle,
            loading: true,
            error: None,
            termination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorError;
    use crate::gateway::GatewayError;

    #[test]
    fn test_terminal_states() {
        use SessionLifecycleState::*;

        for state in [Idle, Initializing, Joining, Active] {
            assert!(!state.is_terminal(), "{state} is not terminal");
        }
        assert!(Terminating.is_terminal());
        assert!(Terminated.is_terminal());
    }

    #[test]
    fn test_view_error_from_session_error() {
        let gateway = ViewError::from(&SessionError::from(GatewayError::http(503)));
        assert_eq!(gateway.code, Some(503));
        assert!(gateway.retriable);

        let precondition = ViewError::from(&SessionError::from(DescriptorError::MissingMeetingNumber));
        assert_eq!(precondition.message, "缺少必要信息");
        assert!(!precondition.retriable);
    }
}
