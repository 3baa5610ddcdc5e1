//! Notification surface: holds the notice currently on screen.
//!
//! Rendering is someone else's job; this only tracks what a modal would show
//! and whether it is open.

use super::{ErrorChannel, ErrorNotice, Registration};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct SurfaceState {
    notice: Option<ErrorNotice>,
    visible: bool,
}

/// The mounted error surface.
#[derive(Debug, Clone, Default)]
pub struct ErrorSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl ErrorSurface {
    /// Create a hidden surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe this surface to `channel`. Keep the returned registration
    /// alive for as long as the surface is mounted.
    #[must_use = "dropping the registration unsubscribes the surface"]
    pub fn attach(&self, channel: &ErrorChannel) -> Registration {
        let surface = self.clone();
        channel.register(move |notice| surface.show(notice.clone()))
    }

    /// Show `notice`, replacing whatever was displayed.
    pub fn show(&self, notice: ErrorNotice) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.notice = Some(notice);
        state.visible = true;
    }

    /// Close the surface and forget the notice.
    pub fn hide(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.visible = false;
        state.notice = None;
    }

    /// The notice on screen, if the surface is open.
    #[must_use]
    pub fn current(&self) -> Option<ErrorNotice> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.visible {
            state.notice.clone()
        } else {
            None
        }
    }
}
