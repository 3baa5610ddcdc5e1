//! Document cleanup after the conferencing client.
//!
//! The client injects styles and stylesheet links, overrides body styles and
//! renders into its own container. [`CleanupPolicy`] lists what to undo.
//! Every step is attempted even if an earlier one failed.

use crate::host::{Display, Document, NodeMatcher};
use crate::observability::metrics;
use std::fmt;
use tracing::{debug, warn};

/// Element the conferencing client renders into.
pub const SDK_CONTAINER_ID: &str = "zmmtg-root";

/// Substring identifying the provider's asset URLs.
pub const PROVIDER_HREF_MARKER: &str = "zoom";

/// Attribute the provider puts on its injected `<style>` nodes.
pub const PROVIDER_STYLE_ATTRIBUTE: &str = "data-zoom";

/// Body style properties the client overrides.
pub const BODY_STYLE_PROPERTIES: [&str; 3] = ["overflow", "margin", "padding"];

/// One teardown step, used for logging and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanupStep {
    HideContainer,
    EmptyContainer,
    RemoveInjectedNodes,
    RemoveStylesheets,
    ResetBodyStyle,
    ClearStore,
    DetachListeners,
}

impl CleanupStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CleanupStep::HideContainer => "hide_container",
            CleanupStep::EmptyContainer => "empty_container",
            CleanupStep::RemoveInjectedNodes => "remove_injected_nodes",
            CleanupStep::RemoveStylesheets => "remove_stylesheets",
            CleanupStep::ResetBodyStyle => "reset_body_style",
            CleanupStep::ClearStore => "clear_store",
            CleanupStep::DetachListeners => "detach_listeners",
        }
    }
}

/// Log and count a failed step; teardown carries on.
pub(crate) fn step_failed(step: CleanupStep, error: &dyn fmt::Display) {
    warn!(target: "ms.controller", step = step.as_str(), error = %error, "Cleanup step failed");
    metrics::record_cleanup_step_failure(step.as_str());
}

/// What the conferencing client leaves behind in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPolicy {
    pub container_id: String,
    /// Injected nodes, removed in the first pass.
    pub injected_nodes: Vec<NodeMatcher>,
    /// Stylesheet links, removed in the second pass.
    pub stylesheets: Vec<NodeMatcher>,
    pub body_properties: Vec<String>,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self::zoom_default()
    }
}

impl CleanupPolicy {
    /// Matchers for the Zoom web client.
    #[must_use]
    pub fn zoom_default() -> Self {
        Self {
            container_id: SDK_CONTAINER_ID.to_string(),
            injected_nodes: vec![
                NodeMatcher::LinkHrefContains(PROVIDER_HREF_MARKER.to_string()),
                NodeMatcher::StyleWithAttribute(PROVIDER_STYLE_ATTRIBUTE.to_string()),
            ],
            stylesheets: vec![NodeMatcher::StylesheetHrefContains(
                PROVIDER_HREF_MARKER.to_string(),
            )],
            body_properties: BODY_STYLE_PROPERTIES.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// Undo the client's document changes. Returns the steps that failed.
    pub fn run(&self, document: &dyn Document) -> Vec<CleanupStep> {
        let mut failed = Vec::new();
        let mut attempt = |step: CleanupStep, result: Result<(), crate::host::DocumentError>| {
            if let Err(e) = result {
                step_failed(step, &e);
                failed.push(step);
            }
        };

        attempt(
            CleanupStep::HideContainer,
            document.set_display(&self.container_id, Display::None),
        );
        attempt(
            CleanupStep::EmptyContainer,
            document.clear_children(&self.container_id),
        );

        for matcher in &self.injected_nodes {
            attempt(
                CleanupStep::RemoveInjectedNodes,
                document.remove_nodes(matcher).map(|removed| {
                    debug!(target: "ms.controller", ?matcher, removed, "Removed injected nodes");
                }),
            );
        }

        for matcher in &self.stylesheets {
            attempt(
                CleanupStep::RemoveStylesheets,
                document.remove_nodes(matcher).map(|removed| {
                    debug!(target: "ms.controller", ?matcher, removed, "Removed stylesheets");
                }),
            );
        }

        for property in &self.body_properties {
            attempt(
                CleanupStep::ResetBodyStyle,
                document.reset_body_style(property),
            );
        }

        failed
    }
}
