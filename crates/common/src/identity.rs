//! Ambient identity token published by the hosting environment.
//!
//! The host (the portal embedding the meeting pages) may or may not hand us a
//! user token, and may replace it at any time. The token lives in a
//! `tokio::sync::watch` channel: the host owns the [`IdentitySender`], every
//! outbound request reads the latest value through an [`IdentityReceiver`].
//!
//! ```rust
//! use common::identity::identity_channel;
//! use common::secret::{ExposeSecret, SecretString};
//!
//! let (sender, receiver) = identity_channel(None);
//! assert!(receiver.token().is_none());
//!
//! sender.publish(Some(SecretString::from("user-token")));
//! assert_eq!(receiver.token().unwrap().expose_secret(), "user-token");
//! ```

use crate::secret::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::watch;

/// Errors from the identity channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The host dropped its sender.
    #[error("Identity channel closed")]
    ChannelClosed,
}

/// Create a linked sender/receiver pair seeded with `initial`.
#[must_use]
pub fn identity_channel(initial: Option<SecretString>) -> (IdentitySender, IdentityReceiver) {
    let (tx, rx) = watch::channel(initial);
    (IdentitySender(tx), IdentityReceiver(rx))
}

/// Host-side handle that publishes the current identity token.
pub struct IdentitySender(watch::Sender<Option<SecretString>>);

impl IdentitySender {
    /// Replace the current token. `None` means the host has no identity.
    pub fn publish(&self, token: Option<SecretString>) {
        self.0.send_replace(token);
    }
}

impl std::fmt::Debug for IdentitySender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySender").finish_non_exhaustive()
    }
}

/// Read side of the identity channel.
///
/// Reads clone the token out of the channel so the borrow is never held
/// across an await point.
#[derive(Clone)]
pub struct IdentityReceiver(watch::Receiver<Option<SecretString>>);

impl IdentityReceiver {
    /// A receiver whose token never changes, for statically configured hosts.
    #[must_use]
    pub fn fixed(token: SecretString) -> Self {
        let (_tx, rx) = watch::channel(Some(token));
        Self(rx)
    }

    /// The current token, if the host provided a non-empty one.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.0
            .borrow()
            .as_ref()
            .filter(|token| !token.expose_secret().is_empty())
            .cloned()
    }

    /// Wait until the host publishes a new value.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::ChannelClosed` once the sender is dropped.
    pub async fn changed(&mut self) -> Result<(), IdentityError> {
        self.0
            .changed()
            .await
            .map_err(|_| IdentityError::ChannelClosed)
    }
}

impl std::fmt::Debug for IdentityReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityReceiver")
            .field("token", &"[REDACTED]")
            .finish()
    }
}
