//! Mailbox messages for the controller actor.

use super::state::TerminationReason;
use crate::sdk::SdkEvent;
use common::types::UserId;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug)]
pub(crate) enum ControllerMessage {
    /// Run the unified leave handler.
    Leave { reason: TerminationReason },

    /// In-meeting event from the conferencing client.
    Sdk(SdkEvent),

    /// Answer to a "who am I" lookup started by a user-leave event.
    CurrentUserResolved {
        left: UserId,
        current: Option<UserId>,
    },
}

impl ControllerMessage {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            ControllerMessage::Leave { .. } => "leave",
            ControllerMessage::Sdk(_) => "sdk_event",
            ControllerMessage::CurrentUserResolved { .. } => "current_user_resolved",
        }
    }
}

/// Deliver `message` from a callback that must not keep the controller alive.
pub(crate) fn post(mailbox: &mpsc::WeakSender<ControllerMessage>, message: ControllerMessage) {
    let Some(sender) = mailbox.upgrade() else {
        debug!(target: "ms.controller", kind = message.kind(), "Controller gone, dropping message");
        return;
    };

    if let Err(e) = sender.try_send(message) {
        debug!(target: "ms.controller", error = %e, "Controller mailbox rejected message");
    }
}
