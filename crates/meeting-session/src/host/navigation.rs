//! Client-side navigation between the meeting screens.

use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Screens of the meeting application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Join,
    Create,
    Meeting,
    /// Post-meeting screen.
    Leave,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Route::Join => "/join",
            Route::Create => "/create",
            Route::Meeting => "/meeting",
            Route::Leave => "/leave",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Router.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only records where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of navigations to `route`.
    #[must_use]
    pub fn count(&self, route: Route) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| **r == route)
            .count()
    }

    #[must_use]
    pub fn last(&self) -> Option<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        debug!(target: "ms.controller", route = %route, "Navigating");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Join.path(), "/join");
        assert_eq!(Route::Create.path(), "/create");
        assert_eq!(Route::Meeting.path(), "/meeting");
        assert_eq!(Route::Leave.to_string(), "/leave");
    }

    #[test]
    fn test_recording_navigator_history() {
        let navigator = RecordingNavigator::new();
        navigator.navigate(Route::Meeting);
        navigator.navigate(Route::Leave);

        assert_eq!(navigator.history(), vec![Route::Meeting, Route::Leave]);
        assert_eq!(navigator.count(Route::Leave), 1);
        assert_eq!(navigator.last(), Some(Route::Leave));
    }
}
