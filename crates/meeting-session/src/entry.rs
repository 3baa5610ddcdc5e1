//! Entry flows around the meeting screen: joining, joining a meeting just
//! created, resuming a pending session, and starting over from the
//! post-meeting screen.

use crate::api::{CreateMeetingResponse, ServerConfig};
use crate::descriptor::{DescriptorError, InviteLink, InviteLinkError, MeetingSessionDescriptor};
use crate::host::{Navigator, Route};
use crate::store::{SessionStore, StoreError};
use common::secret::ExposeSecret;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Display name used when the creator joins the meeting they just created.
pub const CREATOR_DISPLAY_NAME: &str = "会议主持人";

/// Email used when the creator joins the meeting they just created.
pub const CREATOR_EMAIL: &str = "host@example.com";

/// Where a newly created meeting was handed off to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedMeetingHandoff {
    /// Session stored; now on the meeting screen.
    Embedded,
    /// Joining in the page is disabled; the caller opens this invite URL
    /// outside the app.
    OpenInvite(String),
}

/// A join request was rejected before reaching the meeting screen.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("Incomplete join details: {0}")]
    Incomplete(#[from] DescriptorError),

    #[error("Invalid invite link: {0}")]
    InviteLink(#[from] InviteLinkError),

    #[error("Failed to store session: {0}")]
    Store(#[from] StoreError),
}

impl EntryError {
    /// Text shown to the user.
    #[must_use]
    pub fn client_message(&self) -> &'static str {
        match self {
            EntryError::Incomplete(_) => "请填写所有必要信息",
            EntryError::InviteLink(_) => "无效的 Zoom 链接",
            EntryError::Store(_) => "保存会议信息失败",
        }
    }
}

/// The join and post-meeting screens' session handling.
#[derive(Clone)]
pub struct JoinFlow {
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for JoinFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinFlow").finish_non_exhaustive()
    }
}

impl JoinFlow {
    pub fn new(store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Store `descriptor` and go to the meeting screen.
    ///
    /// # Errors
    ///
    /// `EntryError::Incomplete` if required fields are missing, or
    /// `EntryError::Store` if it cannot be saved. Nothing is stored or
    /// navigated on error.
    pub fn begin_join(&self, descriptor: &MeetingSessionDescriptor) -> Result<(), EntryError> {
        descriptor.validate()?;
        self.store.save(descriptor)?;

        info!(
            target: "ms.entry",
            meeting_number = %descriptor.clean_meeting_number(),
            "Joining meeting"
        );
        self.navigator.navigate(Route::Meeting);
        Ok(())
    }

    /// Join from an invite link as `user_name`.
    ///
    /// # Errors
    ///
    /// See [`JoinFlow::begin_join`]; also `EntryError::InviteLink` for a link
    /// without meeting number or password.
    pub fn join_by_invite(
        &self,
        link: &str,
        user_name: &str,
        user_email: &str,
        api_key: &str,
    ) -> Result<(), EntryError> {
        let descriptor = InviteLink::parse(link)?
            .into_descriptor(user_name)
            .with_email(user_email)
            .with_api_key(api_key);
        self.begin_join(&descriptor)
    }

    /// Join a meeting returned by `create_meeting` as its creator.
    ///
    /// When the server disables joining in the page, nothing is stored and
    /// the invite URL is handed back instead.
    ///
    /// # Errors
    ///
    /// `EntryError::InviteLink` if `join_url` has no meeting number, otherwise
    /// see [`JoinFlow::begin_join`].
    pub fn join_created_meeting(
        &self,
        meeting: &CreateMeetingResponse,
        server: &ServerConfig,
    ) -> Result<CreatedMeetingHandoff, EntryError> {
        if !server.join_by_invite_enabled() {
            info!(
                target: "ms.entry",
                meeting_id = meeting.id,
                "Joining in the page is disabled, handing off invite link"
            );
            return Ok(CreatedMeetingHandoff::OpenInvite(meeting.join_url.clone()));
        }

        let meeting_number = InviteLink::meeting_number_from(&meeting.join_url)?;
        let descriptor = MeetingSessionDescriptor::new(
            meeting_number,
            CREATOR_DISPLAY_NAME,
            meeting.password.clone(),
        )
        .with_email(CREATOR_EMAIL)
        .with_api_key(server.zoom_api_key.clone());

        self.begin_join(&descriptor)?;
        Ok(CreatedMeetingHandoff::Embedded)
    }

    /// If a stored session has a meeting number, name, email and password, go
    /// straight to the meeting screen. Returns whether it did.
    #[must_use]
    pub fn resume_pending(&self) -> bool {
        match self.store.load() {
            Some(descriptor) if is_resumable(&descriptor) => {
                info!(target: "ms.entry", "Resuming pending meeting session");
                self.navigator.navigate(Route::Meeting);
                true
            }
            _ => false,
        }
    }

    /// Forget any stored session and go back to the join screen.
    pub fn start_over(&self) {
        if let Err(e) = self.store.clear() {
            warn!(target: "ms.entry", error = %e, "Failed to clear session store");
        }
        self.navigator.navigate(Route::Join);
    }
}

fn is_resumable(descriptor: &MeetingSessionDescriptor) -> bool {
    descriptor.validate().is_ok()
        && !descriptor.user_email.trim().is_empty()
        && !descriptor.pass_word.expose_secret().is_empty()
}
