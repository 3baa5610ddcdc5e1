//! Observability for the meeting session layer.

pub mod metrics;
