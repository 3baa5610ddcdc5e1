//! Meeting session controller.
//!
//! One controller runs per mounted meeting screen. It reads the stored
//! descriptor, drives the conferencing client through preload, credential,
//! init and join, watches the client's in-meeting events and tears down
//! everything it created exactly once, however the session ends.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ─mount─▶ Initializing ─preload─▶ Joining ─credential, init─▶ Active
//!   │                 │                    │                          │
//!   │ no descriptor   │ failure            │ failure                  │ meeting ended, local user left,
//!   ▼                 ▼                    ▼                          │ leave, unmount, page unload
//! Terminated ◀────────┴────────────────────┴──── Terminating ◀────────┘
//! ```
//!
//! Leave paths clear the session store and navigate to `/leave`. Failures
//! keep the error in the view and do not navigate; a retriable failure keeps
//! the descriptor so reloading the page retries.
//!
//! # Known limitation
//!
//! No timeouts are applied to the client's init or join. A client that never
//! calls back leaves the controller in `Joining` or `Active` (loading) until
//! the user leaves or the screen is unmounted.

mod actor;
pub mod cleanup;
mod messages;
pub mod state;

pub use actor::{spawn, ControllerHandle};
pub use cleanup::{CleanupPolicy, CleanupStep, SDK_CONTAINER_ID};
pub use state::{ControllerView, SessionLifecycleState, TerminationReason, ViewError};

use crate::api::SIGNATURE_PATH;
use crate::gateway::GatewayClient;
use crate::host::{Document, Navigator, PageEvents, Route};
use crate::sdk::ConferencingSdk;
use crate::store::SessionStore;
use std::sync::Arc;

/// Collaborators a controller drives.
#[derive(Clone)]
pub struct ControllerDeps {
    pub sdk: Arc<dyn ConferencingSdk>,
    pub document: Arc<dyn Document>,
    pub page: Arc<dyn PageEvents>,
    pub navigator: Arc<dyn Navigator>,
    pub store: SessionStore,
    pub gateway: GatewayClient,
}

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Locale passed to the client's preload.
    pub locale: String,
    /// Absolute URL of the post-meeting screen, handed to the client's init.
    pub leave_url: String,
    /// Credential endpoint.
    pub signature_path: String,
    pub cleanup: CleanupPolicy,
}

impl ControllerSettings {
    /// Settings for an application served from `app_origin`.
    #[must_use]
    pub fn new(app_origin: &str, locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            leave_url: format!(
                "{}{}",
                app_origin.trim_end_matches('/'),
                Route::Leave.path()
            ),
            signature_path: SIGNATURE_PATH.to_string(),
            cleanup: CleanupPolicy::zoom_default(),
        }
    }
}
