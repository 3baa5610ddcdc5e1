//! Page lifecycle events (`unload`, `beforeunload`).

use std::sync::{Arc, Mutex, PoisonError};

/// Page lifecycle events the controller listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageEvent {
    Unload,
    BeforeUnload,
}

impl PageEvent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PageEvent::Unload => "unload",
            PageEvent::BeforeUnload => "beforeunload",
        }
    }
}

/// Handle returned by [`PageEvents::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Page event callback.
pub type PageListener = Arc<dyn Fn(PageEvent) + Send + Sync>;

/// Registry of page-level listeners.
pub trait PageEvents: Send + Sync {
    /// Register `listener` for `event`.
    fn add_listener(&self, event: PageEvent, listener: PageListener) -> ListenerId;

    /// Unregister a listener. Returns `false` if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

#[derive(Default)]
struct PageState {
    next_id: u64,
    listeners: Vec<(ListenerId, PageEvent, PageListener)>,
}

/// Page event registry held in memory. [`InMemoryPage::dispatch`] plays the
/// part of the browser firing an event.
#[derive(Default)]
pub struct InMemoryPage {
    state: Mutex<PageState>,
}

impl std::fmt::Debug for InMemoryPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("InMemoryPage")
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl InMemoryPage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `event`. Listeners run outside the registry lock.
    pub fn dispatch(&self, event: PageEvent) {
        let listeners: Vec<PageListener> = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state
                .listeners
                .iter()
                .filter(|(_, e, _)| *e == event)
                .map(|(_, _, listener)| Arc::clone(listener))
                .collect()
        };

        for listener in listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn listener_count(&self, event: PageEvent) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.listeners.iter().filter(|(_, e, _)| *e == event).count()
    }
}

impl PageEvents for InMemoryPage {
    fn add_listener(&self, event: PageEvent, listener: PageListener) -> ListenerId {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state.listeners.push((id, event, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let before = state.listeners.len();
        state.listeners.retain(|(existing, _, _)| *existing != id);
        state.listeners.len() != before
    }
}
