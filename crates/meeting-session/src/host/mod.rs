//! Host environment: the page the meeting is embedded in.
//!
//! The controller only touches the host through these traits. The in-memory
//! implementations back the binary and the tests.

pub mod document;
pub mod navigation;
pub mod page;

pub use document::{Display, Document, DocumentError, HeadNode, HeadTag, InMemoryDocument, NodeMatcher};
pub use navigation::{Navigator, RecordingNavigator, Route};
pub use page::{InMemoryPage, ListenerId, PageEvent, PageEvents, PageListener};
