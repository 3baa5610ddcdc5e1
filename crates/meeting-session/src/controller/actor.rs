//! The controller task and its handle.
//!
//! The controller is an actor: one tokio task owns the lifecycle state and
//! receives messages through a bounded mailbox. The in-flight step (preload,
//! credential, init or join) is raced against the mailbox, so a leave or
//! unmount is handled while the client is still busy. Listeners handed to the
//! client and the page only hold weak senders; once every
//! [`ControllerHandle`] is dropped the mailbox closes and the controller
//! treats it as an unmount.

use super::cleanup::{step_failed, CleanupStep};
use super::messages::{post, ControllerMessage};
use super::state::{ControllerView, SessionLifecycleState, TerminationReason, ViewError};
use super::{ControllerDeps, ControllerSettings};
use crate::api::{SignatureRequest, SignatureResponse};
use crate::descriptor::MeetingSessionDescriptor;
use crate::errors::{SdkStage, SessionError};
use crate::gateway::GatewayError;
use crate::host::{Display, ListenerId, PageEvent, Route};
use crate::observability::metrics;
use crate::sdk::{InitOptions, JoinParams, SdkError, SdkEvent, SdkEventKind, MEETING_STATUS_ENDED};
use common::secret::{self, SecretString};
use common::types::UserId;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Mailbox capacity. Producers are a handful of listeners and the handle.
const CONTROLLER_CHANNEL_BUFFER: usize = 64;

/// Result of the step currently in flight.
enum StepOutcome {
    Preloaded(Result<(), SdkError>),
    Signed(Result<SignatureResponse, GatewayError>),
    Initialized {
        result: Result<(), SdkError>,
        signature: SecretString,
    },
    Joined(Result<(), SdkError>),
}

type PendingStep = Pin<Box<dyn Future<Output = StepOutcome> + Send>>;

/// Handle to a running controller.
#[derive(Clone)]
pub struct ControllerHandle {
    sender: mpsc::Sender<ControllerMessage>,
    view: watch::Receiver<ControllerView>,
}

impl std::fmt::Debug for ControllerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("view", &*self.view.borrow())
            .finish_non_exhaustive()
    }
}

impl ControllerHandle {
    /// The user asked to leave the meeting.
    pub async fn leave(&self) {
        self.send(ControllerMessage::Leave {
            reason: TerminationReason::LeaveRequested,
        })
        .await;
    }

    /// The meeting screen is going away.
    pub async fn unmount(self) {
        self.send(ControllerMessage::Leave {
            reason: TerminationReason::Unmount,
        })
        .await;
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> ControllerView {
        self.view.borrow().clone()
    }

    /// Receiver that observes every view change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControllerView> {
        self.view.clone()
    }

    /// Wait until `predicate` holds for the view. If the controller stops
    /// first, returns its final view.
    pub async fn wait_for<F>(&self, predicate: F) -> ControllerView
    where
        F: FnMut(&ControllerView) -> bool,
    {
        let mut view = self.view.clone();
        let result = view.wait_for(predicate).await.map(|v| v.clone());
        result.unwrap_or_else(|_| view.borrow().clone())
    }

    /// Wait for `Terminated`.
    pub async fn terminated(&self) -> ControllerView {
        self.wait_for(|v| v.state == SessionLifecycleState::Terminated)
            .await
    }

    async fn send(&self, message: ControllerMessage) {
        let kind = message.kind();
        if self.sender.send(message).await.is_err() {
            debug!(target: "ms.controller", kind, "Controller already stopped");
        }
    }
}

/// Start a controller for the meeting screen.
///
/// Returns the handle and the task's join handle.
pub fn spawn(deps: ControllerDeps, settings: ControllerSettings) -> (ControllerHandle, JoinHandle<()>) {
    let (sender, receiver) = mpsc::channel(CONTROLLER_CHANNEL_BUFFER);
    let (view_tx, view_rx) = watch::channel(ControllerView::default());

    let controller = MeetingSessionController {
        deps,
        settings,
        receiver,
        mailbox: sender.downgrade(),
        view: view_tx,
        state: SessionLifecycleState::Idle,
        descriptor: None,
        page_listeners: Vec::new(),
        sdk_listeners_registered: false,
    };

    let task = tokio::spawn(controller.run());

    (
        ControllerHandle {
            sender,
            view: view_rx,
        },
        task,
    )
}

struct MeetingSessionController {
    deps: ControllerDeps,
    settings: ControllerSettings,
    receiver: mpsc::Receiver<ControllerMessage>,
    /// Weak so that listeners never keep the controller alive.
    mailbox: mpsc::WeakSender<ControllerMessage>,
    view: watch::Sender<ControllerView>,
    state: SessionLifecycleState,
    /// Set at mount; every step after preload reads it.
    descriptor: Option<MeetingSessionDescriptor>,
    page_listeners: Vec<ListenerId>,
    sdk_listeners_registered: bool,
}

async fn next_step(pending: &mut Option<PendingStep>) -> StepOutcome {
    match pending {
        Some(step) => step.await,
        None => std::future::pending().await,
    }
}

impl MeetingSessionController {
    #[instrument(skip_all, name = "ms.controller")]
    async fn run(mut self) {
        info!(target: "ms.controller", "Meeting session controller started");

        let mut pending = self.mount();

        while !self.state.is_terminal() {
            tokio::select! {
                outcome = next_step(&mut pending) => {
                    pending = self.advance(outcome);
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => self.handle_message(message),
                        None => {
                            debug!(target: "ms.controller", "All handles dropped, unmounting");
                            self.leave(TerminationReason::Unmount);
                        }
                    }
                }
            }
        }

        info!(
            target: "ms.controller",
            state = %self.state,
            abandoned_step = pending.is_some(),
            "Meeting session controller stopped"
        );
    }

    /// Read the stored descriptor and start preloading the client.
    fn mount(&mut self) -> Option<PendingStep> {
        let Some(descriptor) = self.deps.store.load() else {
            info!(target: "ms.controller", "No pending meeting session, redirecting to join");
            self.deps.navigator.navigate(Route::Join);
            self.finish(TerminationReason::NoSession, None);
            return None;
        };

        if let Err(e) = descriptor.validate() {
            self.fail(SessionError::from(e));
            return None;
        }

        info!(
            target: "ms.controller",
            meeting_number = %descriptor.clean_meeting_number(),
            "Mounting meeting session"
        );

        self.descriptor = Some(descriptor);
        self.attach_page_listeners();
        self.transition(SessionLifecycleState::Initializing);

        let sdk = Arc::clone(&self.deps.sdk);
        let locale = self.settings.locale.clone();
        Some(Box::pin(async move {
            StepOutcome::Preloaded(sdk.preload(&locale).await)
        }))
    }

    /// Apply a finished step and start the next one.
    fn advance(&mut self, outcome: StepOutcome) -> Option<PendingStep> {
        let descriptor = self.descriptor.clone()?;

        match outcome {
            StepOutcome::Preloaded(Ok(())) => {
                debug!(target: "ms.controller", "Client preloaded");
                self.transition(SessionLifecycleState::Joining);
                Some(self.request_signature(&descriptor))
            }
            StepOutcome::Preloaded(Err(e)) => {
                self.fail(SessionError::sdk(SdkStage::Preload, e));
                None
            }
            StepOutcome::Signed(Ok(response)) => {
                debug!(target: "ms.controller", "Join signature received");
                Some(self.init_client(response.signature))
            }
            StepOutcome::Signed(Err(e)) => {
                self.fail(SessionError::Gateway(e));
                None
            }
            StepOutcome::Initialized {
                result: Ok(()),
                signature,
            } => {
                debug!(target: "ms.controller", "Client initialized, joining");
                if let Err(e) = self
                    .deps
                    .document
                    .set_display(&self.settings.cleanup.container_id, Display::Block)
                {
                    warn!(target: "ms.controller", error = %e, "Failed to reveal client container");
                }
                self.transition(SessionLifecycleState::Active);
                Some(self.join_meeting(&descriptor, signature))
            }
            StepOutcome::Initialized { result: Err(e), .. } => {
                self.fail(SessionError::sdk(SdkStage::Init, e));
                None
            }
            StepOutcome::Joined(Ok(())) => {
                info!(target: "ms.controller", "Joined meeting");
                self.view.send_modify(|view| view.loading = false);
                self.register_sdk_listeners();
                None
            }
            StepOutcome::Joined(Err(e)) => {
                self.fail(SessionError::sdk(SdkStage::Join, e));
                None
            }
        }
    }

    /// The credential request runs as its own task: leaving abandons the
    /// result but does not abort the request.
    fn request_signature(&self, descriptor: &MeetingSessionDescriptor) -> PendingStep {
        let gateway = self.deps.gateway.clone();
        let path = self.settings.signature_path.clone();
        let request = SignatureRequest {
            meeting_number: descriptor.clean_meeting_number(),
            role: descriptor.role,
        };

        let task = tokio::spawn(async move { gateway.generate_signature(&path, &request).await });

        Box::pin(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    error!(target: "ms.controller", error = %e, "Signature task failed");
                    Err(GatewayError::transport())
                }
            };
            StepOutcome::Signed(result)
        })
    }

    fn init_client(&self, signature: SecretString) -> PendingStep {
        let sdk = Arc::clone(&self.deps.sdk);
        let options = InitOptions::new(self.settings.leave_url.clone());

        Box::pin(async move {
            let result = sdk.init(options).await;
            StepOutcome::Initialized { result, signature }
        })
    }

    fn join_meeting(&self, descriptor: &MeetingSessionDescriptor, signature: SecretString) -> PendingStep {
        let sdk = Arc::clone(&self.deps.sdk);
        let params = JoinParams {
            signature,
            sdk_key: descriptor.api_key.clone(),
            meeting_number: descriptor.clean_meeting_number(),
            pass_word: descriptor.pass_word.clone(),
            user_name: descriptor.user_name.clone(),
            user_email: descriptor.user_email.clone(),
            tk: descriptor
                .registrant_token
                .clone()
                .unwrap_or_else(secret::empty),
            zak: descriptor.zak_token.clone().unwrap_or_else(secret::empty),
        };

        Box::pin(async move { StepOutcome::Joined(sdk.join(params).await) })
    }

    fn handle_message(&mut self, message: ControllerMessage) {
        match message {
            ControllerMessage::Leave { reason } => self.leave(reason),

            ControllerMessage::Sdk(SdkEvent::MeetingStatus { status }) => {
                debug!(target: "ms.controller", status, "Meeting status changed");
                if status == MEETING_STATUS_ENDED && self.state == SessionLifecycleState::Active {
                    self.leave(TerminationReason::MeetingEnded);
                }
            }

            ControllerMessage::Sdk(SdkEvent::UserLeave { user_id }) => {
                if self.state == SessionLifecycleState::Active {
                    self.resolve_local_user(user_id);
                }
            }

            ControllerMessage::CurrentUserResolved { left, current } => {
                // Only an exact match counts; an unresolved local user is ignored
                if current == Some(left) && self.state == SessionLifecycleState::Active {
                    self.leave(TerminationReason::LocalUserLeft);
                } else {
                    debug!(
                        target: "ms.controller",
                        left = %left,
                        current = ?current,
                        "Another participant left"
                    );
                }
            }
        }
    }

    /// Ask the client who the local user is and report back through the mailbox.
    fn resolve_local_user(&self, left: UserId) {
        let sdk = Arc::clone(&self.deps.sdk);
        let mailbox = self.mailbox.clone();

        tokio::spawn(async move {
            let current = match sdk.current_user().await {
                Ok(user) => user.map(|u| u.user_id),
                Err(e) => {
                    debug!(target: "ms.controller", error = %e, "Current user lookup failed");
                    None
                }
            };
            post(&mailbox, ControllerMessage::CurrentUserResolved { left, current });
        });
    }

    /// Unified leave handler. Runs at most once per controller.
    fn leave(&mut self, reason: TerminationReason) {
        if self.state.is_terminal() {
            debug!(target: "ms.controller", reason = reason.as_str(), "Already leaving, ignoring");
            return;
        }

        info!(target: "ms.controller", reason = reason.as_str(), "Leaving meeting");
        self.transition(SessionLifecycleState::Terminating);
        self.teardown(true);
        self.deps.navigator.navigate(Route::Leave);
        self.finish(reason, None);
    }

    /// A failure before `Active`: clean up, keep the error on screen, stay put.
    fn fail(&mut self, error: SessionError) {
        warn!(
            target: "ms.controller",
            error = %error,
            retriable = error.is_retriable(),
            "Meeting session failed"
        );

        // A retriable failure keeps the descriptor so a reload can try again
        self.teardown(!error.is_retriable());

        self.finish(TerminationReason::Failed, Some(ViewError::from(&error)));
    }

    fn teardown(&mut self, clear_store: bool) {
        let failed = self.settings.cleanup.run(self.deps.document.as_ref());

        if clear_store {
            if let Err(e) = self.deps.store.clear() {
                step_failed(CleanupStep::ClearStore, &e);
            }
        }

        self.detach_page_listeners();

        debug!(target: "ms.controller", failed_steps = failed.len(), "Teardown complete");
    }

    fn attach_page_listeners(&mut self) {
        for event in [PageEvent::BeforeUnload, PageEvent::Unload] {
            let mailbox = self.mailbox.clone();
            let id = self.deps.page.add_listener(
                event,
                Arc::new(move |_: PageEvent| {
                    post(
                        &mailbox,
                        ControllerMessage::Leave {
                            reason: TerminationReason::PageUnload,
                        },
                    );
                }),
            );
            self.page_listeners.push(id);
        }
    }

    fn detach_page_listeners(&mut self) {
        for id in std::mem::take(&mut self.page_listeners) {
            if !self.deps.page.remove_listener(id) {
                step_failed(CleanupStep::DetachListeners, &"listener was not registered");
            }
        }
    }

    /// Subscribe to meeting-ended and user-left. The client offers no way to
    /// unsubscribe, so this happens once per controller.
    fn register_sdk_listeners(&mut self) {
        if self.sdk_listeners_registered {
            return;
        }
        self.sdk_listeners_registered = true;

        for kind in [SdkEventKind::MeetingStatus, SdkEventKind::UserLeave] {
            let mailbox = self.mailbox.clone();
            self.deps.sdk.on_event(
                kind,
                Arc::new(move |event: SdkEvent| post(&mailbox, ControllerMessage::Sdk(event))),
            );
        }
    }

    fn transition(&mut self, state: SessionLifecycleState) {
        debug!(target: "ms.controller", from = %self.state, to = %state, "State transition");
        self.state = state;
        self.view.send_modify(|view| view.state = state);
    }

    /// Enter `Terminated`. The final view is published in one update.
    fn finish(&mut self, reason: TerminationReason, error: Option<ViewError>) {
        debug!(target: "ms.controller", from = %self.state, "State transition to terminated");
        self.state = SessionLifecycleState::Terminated;
        self.view.send_modify(|view| {
            view.state = SessionLifecycleState::Terminated;
            view.loading = false;
            view.error = error;
            view.termination = Some(reason);
        });
        metrics::record_session_terminated(reason.as_str());
        info!(target: "ms.controller", reason = reason.as_str(), "Meeting session terminated");
    }
}
