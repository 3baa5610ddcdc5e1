//! Session store: the active meeting's descriptor under a fixed key.

use super::{KeyValueStore, StoreError};
use crate::descriptor::MeetingSessionDescriptor;
use crate::observability::metrics;
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key for the pending meeting descriptor.
pub const SESSION_KEY: &str = "zoom_meeting_info";

/// Persists the descriptor between the join screen and the meeting screen.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Write `descriptor`, replacing any previous session.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the descriptor cannot be encoded or written.
    pub fn save(&self, descriptor: &MeetingSessionDescriptor) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(descriptor)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.backend.set(SESSION_KEY, &serialized)?;
        debug!(target: "ms.store", "Session descriptor saved");
        Ok(())
    }

    /// Read the stored descriptor.
    ///
    /// Unreadable storage and malformed entries both read as "no session".
    /// A malformed entry is removed.
    #[must_use]
    pub fn load(&self) -> Option<MeetingSessionDescriptor> {
        let raw = match self.backend.get(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(target: "ms.store", error = %e, "Failed to read session descriptor");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                warn!(target: "ms.store", error = %e, "Discarding corrupt session descriptor");
                metrics::record_store_corrupt_entry();
                if let Err(e) = self.backend.remove(SESSION_KEY) {
                    warn!(target: "ms.store", error = %e, "Failed to remove corrupt session descriptor");
                }
                None
            }
        }
    }

    /// Delete the stored descriptor.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing medium cannot be updated.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.remove(SESSION_KEY)?;
        debug!(target: "ms.store", "Session descriptor cleared");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use common::secret::{ExposeSecret, SecretString};

    fn memory() -> (Arc<MemoryStore>, SessionStore) {
        let backend = Arc::new(MemoryStore::new());
        (backend.clone(), SessionStore::new(backend))
    }

    fn descriptor() -> MeetingSessionDescriptor {
        MeetingSessionDescriptor::new("857 4606 5432", "Alice", SecretString::from("123456"))
            .with_email("alice@example.com")
    }

    #[test]
    fn test_save_then_load() {
        let (_, store) = memory();
        store.save(&descriptor()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.meeting_number, "857 4606 5432");
        assert_eq!(loaded.user_email, "alice@example.com");
        assert_eq!(loaded.pass_word.expose_secret(), "123456");
    }

    #[test]
    fn test_load_absent() {
        let (_, store) = memory();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_malformed_entries_are_absent_and_removed() {
        let malformed = [
            "",
            "{",
            "not json",
            "null",
            "42",
            "[]",
            r#"{"userName":"Alice"}"#,
            r#"{"meetingNumber":123,"userName":"Alice"}"#,
            r#"{"meetingNumber":"1","userName":"Alice","role":9}"#,
        ];

        for raw in malformed {
            let (backend, store) = memory();
            backend.set(SESSION_KEY, raw).unwrap();

            assert!(store.load().is_none(), "entry {raw:?} should read as absent");
            assert!(backend.is_empty(), "entry {raw:?} should be removed");
        }
    }

    #[test]
    fn test_clear_removes_only_session_key() {
        let (backend, store) = memory();
        backend.set("theme", "dark").unwrap();
        store.save(&descriptor()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert!(store.load().is_none());
        assert_eq!(backend.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_backed_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        SessionStore::new(Arc::new(FileStore::new(&path)))
            .save(&descriptor())
            .unwrap();

        let reopened = SessionStore::new(Arc::new(FileStore::new(&path)));
        assert_eq!(reopened.load().unwrap().user_name, "Alice");
    }
}
