//! API gateway client.
//!
//! Every outbound request from the meeting pages goes through
//! [`GatewayClient::request`]. The client:
//!
//! - prefixes the configured base path onto root-relative paths
//! - attaches the host's identity token unless the caller set that header
//! - serializes the body as JSON for non-GET methods only
//! - classifies failures into a single [`GatewayError`] (transport, then HTTP
//!   status, then envelope `success = false`)
//! - publishes a notice to the [`ErrorChannel`] before returning any failure
//! - returns only the envelope payload on success
//!
//! GET is idempotent; callers must not assume idempotence for other verbs.
//! The client does not retry.

pub mod envelope;
pub mod error;

pub use envelope::ApiEnvelope;
pub use error::{status_message, FailureKind, GatewayError};

use crate::notify::{ErrorChannel, ErrorNotice};
use crate::observability::metrics;
use common::identity::IdentityReceiver;
use common::secret::{ExposeSecret, SecretString};
use error::REQUEST_FAILED_TITLE;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Default timeout for gateway requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Header carrying the host identity token unless configured otherwise.
pub const DEFAULT_IDENTITY_HEADER: &str = "Token";

/// The client could not be constructed.
#[derive(Debug, Error)]
pub enum GatewayBuildError {
    /// The identity header name is not a valid HTTP header name.
    #[error("Invalid identity header name: {0}")]
    InvalidHeaderName(String),

    /// The underlying HTTP client failed to build.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Construction parameters for [`GatewayClient`].
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Prefix for root-relative paths (e.g. `https://portal.example.com/apps/meeting`).
    pub base_path: Option<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Header name for the identity token. `Authorization` gets a `Bearer` scheme.
    pub identity_header: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_path: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
        }
    }
}

/// The single chokepoint for network calls.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    base_path: Option<String>,
    identity: Option<IdentityReceiver>,
    identity_header: HeaderName,
    notices: ErrorChannel,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_path", &self.base_path)
            .field("identity", &self.identity)
            .field("identity_header", &self.identity_header)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Create a gateway client.
    ///
    /// # Errors
    ///
    /// Returns `GatewayBuildError` if the header name is invalid or the HTTP
    /// client cannot be built.
    pub fn new(
        settings: GatewaySettings,
        identity: Option<IdentityReceiver>,
        notices: ErrorChannel,
    ) -> Result<Self, GatewayBuildError> {
        let identity_header = HeaderName::from_bytes(settings.identity_header.as_bytes())
            .map_err(|_| GatewayBuildError::InvalidHeaderName(settings.identity_header.clone()))?;

        let http = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                error!(target: "ms.gateway", error = %e, "Failed to build HTTP client");
                GatewayBuildError::HttpClient(e.to_string())
            })?;

        let base_path = settings
            .base_path
            .map(|base| base.trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty());

        Ok(Self {
            http,
            base_path,
            identity,
            identity_header,
            notices,
        })
    }

    /// The notice channel failures are published to.
    #[must_use]
    pub fn notices(&self) -> &ErrorChannel {
        &self.notices
    }

    /// Resolve `path` against the base path.
    ///
    /// Only root-relative paths (`/api/...`) are prefixed; absolute URLs and
    /// protocol-relative paths pass through unchanged.
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        match &self.base_path {
            Some(base) if path.starts_with('/') && !path.starts_with("//") => {
                format!("{base}{path}")
            }
            _ => path.to_string(),
        }
    }

    /// Send a request and return the envelope payload.
    ///
    /// `headers` are applied as given; a caller-supplied header with the
    /// identity header's name (case-insensitive) suppresses the ambient token.
    ///
    /// # Errors
    ///
    /// Returns the classified [`GatewayError`] after publishing a notice.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn request<T, B>(
        &self,
        path: &str,
        method: Method,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let started = Instant::now();
        let result = self.execute(path, &method, body, headers).await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::record_gateway_request(method.as_str(), outcome, started.elapsed());

        result.map_err(|e| self.fail(e))
    }

    /// `GET` with no body.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.request::<T, ()>(path, Method::GET, None, &[]).await
    }

    /// `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::request`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, Method::POST, Some(body), &[]).await
    }

    /// `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::request`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, Method::PUT, Some(body), &[]).await
    }

    /// `DELETE` with no body.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::request`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.request::<T, ()>(path, Method::DELETE, None, &[]).await
    }

    async fn execute<T, B>(
        &self,
        path: &str,
        method: &Method,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.resolve_url(path);
        let mut builder = self.http.request(method.clone(), url.as_str());

        let caller_sets = |name: &str| headers.iter().any(|(h, _)| h.eq_ignore_ascii_case(name));

        if !caller_sets(CONTENT_TYPE.as_str()) {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        if !caller_sets(self.identity_header.as_str()) {
            if let Some(token) = self.identity.as_ref().and_then(IdentityReceiver::token) {
                builder = builder.header(self.identity_header.clone(), self.identity_value(&token));
            }
        }

        if let Some(body) = body.filter(|_| *method != Method::GET) {
            let bytes = serde_json::to_vec(body).map_err(|e| {
                warn!(target: "ms.gateway", error = %e, "Failed to serialize request body");
                GatewayError::transport()
            })?;
            builder = builder.body(bytes);
        }

        debug!(target: "ms.gateway", url = %url, "Sending request");

        let response = builder.send().await.map_err(|e| {
            warn!(target: "ms.gateway", error = %e, url = %url, "Request failed before a response");
            GatewayError::transport()
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::http(status.as_u16()));
        }

        let envelope: ApiEnvelope<Value> = response.json().await.map_err(|e| {
            warn!(target: "ms.gateway", error = %e, status = %status, "Response is not a valid envelope");
            GatewayError::malformed_response()
        })?;

        envelope.into_payload()
    }

    fn identity_value(&self, token: &SecretString) -> String {
        if self.identity_header == AUTHORIZATION {
            format!("Bearer {}", token.expose_secret())
        } else {
            token.expose_secret().to_string()
        }
    }

    fn fail(&self, error: GatewayError) -> GatewayError {
        metrics::record_gateway_failure(error.kind.as_str());
        warn!(
            target: "ms.gateway",
            code = error.code,
            kind = error.kind.as_str(),
            message = %error.message,
            "Gateway request failed"
        );

        self.notices.publish(&ErrorNotice {
            title: Some(REQUEST_FAILED_TITLE.to_string()),
            message: error.message.clone(),
            status_code: Some(error.code),
        });

        error
    }
}
