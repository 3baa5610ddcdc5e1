//! Meeting Session
//!
//! Host-side entry point for the meeting pages. It checks what a meeting
//! screen would start from and exits.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment
//! 2. Initialize tracing (`MS_LOG_LEVEL`, `MS_JSON_LOGS`)
//! 3. Attach a log-backed handler to the error broadcast channel
//! 4. Build the API gateway client with the ambient identity token
//! 5. Fetch the server configuration
//! 6. Report whether a pending session is stored

#![warn(clippy::pedantic)]

use std::collections::HashMap;
use std::sync::Arc;

use common::config::ObservabilityConfig;
use common::identity::IdentityReceiver;
use meeting_session::config::Config;
use meeting_session::gateway::GatewayClient;
use meeting_session::notify::ErrorChannel;
use meeting_session::store::{FileStore, SessionStore};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let vars: HashMap<String, String> = std::env::vars().collect();

    init_tracing(&ObservabilityConfig::from_vars(&vars));

    info!("Starting Meeting Session");

    let config = Config::from_vars(&vars).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        api_base_path = ?config.api_base_path,
        app_origin = %config.app_origin,
        locale = %config.locale,
        store_path = %config.store_path.display(),
        has_identity = config.has_identity(),
        "Configuration loaded successfully"
    );

    // Registered for the lifetime of the process
    let notices = ErrorChannel::new();
    notices.set_handler(|notice| {
        warn!(
            target: "ms.notify",
            title = ?notice.title,
            status_code = ?notice.status_code,
            message = %notice.message,
            "Request failed"
        );
    });

    let identity = config.identity_token.clone().map(IdentityReceiver::fixed);
    let gateway = GatewayClient::new(config.gateway_settings(), identity, notices.clone())
        .map_err(|e| {
            error!(error = %e, "Failed to build gateway client");
            e
        })?;

    match gateway.server_config().await {
        Ok(server_config) => info!(
            join_by_invite_enabled = server_config.join_by_invite_enabled(),
            sdk_key_configured = !server_config.zoom_api_key.is_empty(),
            "Server configuration loaded"
        ),
        // Already reported through the notice channel
        Err(e) => warn!(code = e.code, "Server configuration unavailable"),
    }

    let store = SessionStore::new(Arc::new(FileStore::new(&config.store_path)));
    match store.load() {
        Some(descriptor) => info!(
            meeting_number = %descriptor.clean_meeting_number(),
            complete = descriptor.validate().is_ok(),
            "Pending meeting session found"
        ),
        None => info!("No pending meeting session"),
    }

    notices.clear_handler();
    info!("Meeting Session finished");
    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
