//! Error broadcast channel.
//!
//! A single-slot relay between network code and whichever notification
//! surface is currently mounted. Exactly one handler is active at a time;
//! the last [`ErrorChannel::set_handler`] wins and [`ErrorChannel::clear_handler`]
//! restores the no-op. Publishing with no handler is silently dropped.
//!
//! The channel is an explicit object created once at application start and
//! cloned into the gateway client; there is no process-global slot.

pub mod surface;

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// User-facing notice delivered to the active handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNotice {
    /// Optional heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Message body.
    pub message: String,
    /// HTTP status or business code, when one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i32>,
}

/// Handler signature for notification surfaces.
pub type NoticeHandler = Arc<dyn Fn(&ErrorNotice) + Send + Sync>;

#[derive(Default)]
struct Slot {
    /// Bumped on every set/clear so stale registrations can tell they were replaced.
    generation: u64,
    handler: Option<NoticeHandler>,
}

/// Single-subscriber notification relay. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct ErrorChannel {
    slot: Arc<RwLock<Slot>>,
}

impl ErrorChannel {
    /// Create an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active handler.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&ErrorNotice) + Send + Sync + 'static,
    {
        self.install(Some(Arc::new(handler)));
    }

    /// Restore the no-op handler.
    pub fn clear_handler(&self) {
        self.install(None);
    }

    /// Install `handler` and return a guard that clears it on drop, unless
    /// another handler has replaced it in the meantime.
    #[must_use = "dropping the registration immediately clears the handler"]
    pub fn register<F>(&self, handler: F) -> Registration
    where
        F: Fn(&ErrorNotice) + Send + Sync + 'static,
    {
        let generation = self.install(Some(Arc::new(handler)));
        Registration {
            channel: self.clone(),
            generation,
        }
    }

    /// Whether a handler is currently installed.
    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handler
            .is_some()
    }

    /// Deliver `notice` to the active handler, if any.
    ///
    /// The handler runs outside the lock, so it may itself call
    /// `set_handler`/`clear_handler`.
    pub fn publish(&self, notice: &ErrorNotice) {
        let handler = self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handler
            .clone();

        match handler {
            Some(handler) => handler(notice),
            None => trace!(target: "ms.notify", "No notice handler registered, dropping notice"),
        }
    }

    fn install(&self, handler: Option<NoticeHandler>) -> u64 {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.generation = slot.generation.wrapping_add(1);
        slot.handler = handler;
        slot.generation
    }

    fn clear_if_current(&self, generation: u64) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.generation == generation {
            slot.generation = slot.generation.wrapping_add(1);
            slot.handler = None;
        }
    }
}

impl std::fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("has_handler", &self.has_handler())
            .finish()
    }
}

/// Guard returned by [`ErrorChannel::register`].
#[derive(Debug)]
pub struct Registration {
    channel: ErrorChannel,
    generation: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.channel.clear_if_current(self.generation);
    }
}
