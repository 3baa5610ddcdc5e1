//! Scripted conferencing client.
//!
//! Each call resolves according to a [`Step`]; listeners are kept so tests
//! can fire in-meeting events. When given a document it mutates it the way
//! the real client does (injected styles, body overrides, container content),
//! which lets teardown be checked end to end.

use super::{
    ConferencingSdk, InitOptions, JoinParams, SdkError, SdkEvent, SdkEventKind, SdkEventListener,
    SdkUser,
};
use crate::host::{HeadNode, InMemoryDocument};
use std::sync::{Arc, Mutex, PoisonError};

/// Marker attribute the provider puts on its `<style>` nodes.
pub const INJECTED_STYLE_ATTRIBUTE: &str = "data-zoom";

/// Stylesheet the provider injects on init.
pub const INJECTED_STYLESHEET: &str = "https://source.zoom.us/3.1.6/css/bootstrap.css";

/// How a scripted call resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Succeed,
    Fail(SdkError),
    /// Never resolves.
    Hang,
}

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCall {
    Preload { locale: String },
    Init(InitOptions),
    Join { meeting_number: String },
    CurrentUser,
}

/// Scripted [`ConferencingSdk`].
pub struct MockSdk {
    preload: Step,
    init: Step,
    join: Step,
    current_user: Mutex<Option<SdkUser>>,
    document: Option<(Arc<InMemoryDocument>, String)>,
    calls: Mutex<Vec<SdkCall>>,
    last_join: Mutex<Option<JoinParams>>,
    listeners: Mutex<Vec<(SdkEventKind, SdkEventListener)>>,
}

impl Default for MockSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSdk {
    /// A client on which every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            preload: Step::Succeed,
            init: Step::Succeed,
            join: Step::Succeed,
            current_user: Mutex::new(None),
            document: None,
            calls: Mutex::new(Vec::new()),
            last_join: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_preload(mut self, step: Step) -> Self {
        self.preload = step;
        self
    }

    #[must_use]
    pub fn with_init(mut self, step: Step) -> Self {
        self.init = step;
        self
    }

    #[must_use]
    pub fn with_join(mut self, step: Step) -> Self {
        self.join = step;
        self
    }

    #[must_use]
    pub fn with_current_user(self, user: SdkUser) -> Self {
        self.set_current_user(Some(user));
        self
    }

    /// Mutate `document` like the real client: styles on init, meeting UI
    /// inside `container_id` on join.
    #[must_use]
    pub fn injecting_into(mut self, document: Arc<InMemoryDocument>, container_id: &str) -> Self {
        self.document = Some((document, container_id.to_string()));
        self
    }

    /// Change what `current_user` reports.
    pub fn set_current_user(&self, user: Option<SdkUser>) {
        *self
            .current_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = user;
    }

    /// Deliver `event` to every listener subscribed to its kind.
    pub fn emit(&self, event: SdkEvent) {
        let listeners: Vec<SdkEventListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn listener_count(&self, kind: SdkEventKind) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<SdkCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Parameters of the most recent `join` call.
    #[must_use]
    pub fn last_join(&self) -> Option<JoinParams> {
        self.last_join
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: SdkCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    async fn resolve(step: Step) -> Result<(), SdkError> {
        match step {
            Step::Succeed => Ok(()),
            Step::Fail(e) => Err(e),
            Step::Hang => std::future::pending().await,
        }
    }
}

#[async_trait::async_trait]
impl ConferencingSdk for MockSdk {
    async fn preload(&self, locale: &str) -> Result<(), SdkError> {
        self.record(SdkCall::Preload {
            locale: locale.to_string(),
        });
        Self::resolve(self.preload.clone()).await
    }

    async fn init(&self, options: InitOptions) -> Result<(), SdkError> {
        self.record(SdkCall::Init(options));
        let result = Self::resolve(self.init.clone()).await;

        if let (Ok(()), Some((document, _))) = (&result, &self.document) {
            document.append_head(HeadNode::style().with_data_attribute(INJECTED_STYLE_ATTRIBUTE));
            document.append_head(HeadNode::link("stylesheet", INJECTED_STYLESHEET));
            document.set_body_style("overflow", "hidden");
            document.set_body_style("margin", "0");
            document.set_body_style("padding", "0");
        }
        result
    }

    async fn join(&self, params: JoinParams) -> Result<(), SdkError> {
        self.record(SdkCall::Join {
            meeting_number: params.meeting_number.clone(),
        });
        *self
            .last_join
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(params);

        let result = Self::resolve(self.join.clone()).await;

        if let (Ok(()), Some((document, container_id))) = (&result, &self.document) {
            document.append_child(container_id, "meeting-client");
        }
        result
    }

    async fn current_user(&self) -> Result<Option<SdkUser>, SdkError> {
        self.record(SdkCall::CurrentUser);
        Ok(self
            .current_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn on_event(&self, kind: SdkEventKind, listener: SdkEventListener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, listener));
    }
}
