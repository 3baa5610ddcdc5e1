//! Meeting Session Library
//!
//! Embeds a third-party conferencing client in a page and returns the user to
//! a clean state afterwards:
//!
//! - Acquires a join credential through the API gateway
//! - Drives the client through preload, init and join exactly once per mount
//! - Watches the client's in-meeting events (meeting ended, local user left)
//! - Tears down injected DOM, page listeners and the stored session exactly
//!   once, however the session ends
//!
//! # Architecture
//!
//! ```text
//! join screen ──save──▶ SessionStore ──load──▶ controller (actor)
//!                                                │   │   │
//!                         GatewayClient ◀────────┘   │   └──▶ Document / PageEvents / Navigator
//!                              │                     ▼
//!                              ▼               ConferencingSdk
//!                         ErrorChannel ──▶ ErrorSurface
//! ```
//!
//! # Modules
//!
//! - [`controller`] - Meeting session lifecycle state machine
//! - [`gateway`] - Single chokepoint for network calls with uniform failure classification
//! - [`notify`] - Single-slot error broadcast channel and notification surface
//! - [`store`] - Durable key-value storage and the session store
//! - [`sdk`] - Capability interface over the conferencing client
//! - [`host`] - Document, page events and navigation
//! - [`entry`] - Join, created-meeting handoff, resume and start-over flows
//! - [`api`] - Credential, server configuration and meeting creation endpoints
//! - [`config`] - Configuration from environment
//! - [`errors`] - Error taxonomy for the controller

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod controller;
pub mod descriptor;
pub mod entry;
pub mod errors;
pub mod gateway;
pub mod host;
pub mod notify;
pub mod observability;
pub mod sdk;
pub mod store;
