//! Bindings for the backend endpoints used by the meeting pages.

use crate::gateway::{GatewayClient, GatewayError};
use common::secret::{self, SecretString};
use common::types::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

/// Credential endpoint.
pub const SIGNATURE_PATH: &str = "/api/signature";

/// Server configuration endpoint.
pub const CONFIG_PATH: &str = "/api/config";

/// Meeting creation endpoint.
pub const MEETINGS_PATH: &str = "/api/meetings";

/// Request body for a join signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    /// Meeting number with whitespace removed.
    pub meeting_number: String,
    /// Requested role.
    pub role: Role,
}

/// Join signature issued by the backend.
#[derive(Clone, Deserialize)]
pub struct SignatureResponse {
    /// Signed credential handed to the SDK's join call.
    #[serde(with = "secret::expose")]
    pub signature: SecretString,
}

impl std::fmt::Debug for SignatureResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureResponse")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Server-side switches read by the entry screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Hide the manual join-by-invite path.
    #[serde(default)]
    pub disable_join_meeting: bool,
    /// SDK key for the embedded client.
    #[serde(default)]
    pub zoom_api_key: String,
}

impl ServerConfig {
    /// Whether the join-by-invite path is exposed.
    #[must_use]
    pub fn join_by_invite_enabled(&self) -> bool {
        !self.disable_join_meeting
    }
}

/// Kind of meeting to create. Encoded on the wire as `1`/`2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MeetingKind {
    /// Starts now (`1`).
    #[default]
    Instant,
    /// Starts at a given time (`2`).
    Scheduled,
}

/// Meeting kind the pages do not create.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown meeting kind: {0}")]
pub struct UnknownMeetingKind(pub u8);

impl TryFrom<u8> for MeetingKind {
    type Error = UnknownMeetingKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MeetingKind::Instant),
            2 => Ok(MeetingKind::Scheduled),
            other => Err(UnknownMeetingKind(other)),
        }
    }
}

impl From<MeetingKind> for u8 {
    fn from(kind: MeetingKind) -> Self {
        match kind {
            MeetingKind::Instant => 1,
            MeetingKind::Scheduled => 2,
        }
    }
}

/// In-meeting defaults. Unset switches are left to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_video: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_video: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_before_host: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute_upon_entry: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_room: Option<bool>,
}

/// Request body for creating a meeting.
#[derive(Clone, Serialize)]
pub struct CreateMeetingRequest {
    pub topic: String,
    #[serde(rename = "type")]
    pub kind: MeetingKind,
    /// RFC 3339 start time; scheduled meetings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Length in minutes; scheduled meetings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(with = "secret::expose_option", skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<MeetingSettings>,
}

impl std::fmt::Debug for CreateMeetingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateMeetingRequest")
            .field("topic", &self.topic)
            .field("kind", &self.kind)
            .field("start_time", &self.start_time)
            .field("duration", &self.duration)
            .field("timezone", &self.timezone)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("agenda", &self.agenda)
            .field("settings", &self.settings)
            .finish()
    }
}

impl CreateMeetingRequest {
    /// A meeting that starts now.
    pub fn instant(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            kind: MeetingKind::Instant,
            start_time: None,
            duration: None,
            timezone: None,
            password: None,
            agenda: None,
            settings: None,
        }
    }

    /// A meeting starting at `start_time` (RFC 3339) for `duration` minutes.
    pub fn scheduled(
        topic: impl Into<String>,
        start_time: impl Into<String>,
        duration: u32,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            kind: MeetingKind::Scheduled,
            start_time: Some(start_time.into()),
            duration: Some(duration),
            timezone: Some(timezone.into()),
            ..Self::instant(topic)
        }
    }

    /// Set the join password. Blank input leaves it to the provider.
    #[must_use]
    pub fn with_password(mut self, password: &str) -> Self {
        let password = password.trim();
        self.password = (!password.is_empty()).then(|| SecretString::from(password.to_string()));
        self
    }

    /// Set the agenda. Blank input is dropped.
    #[must_use]
    pub fn with_agenda(mut self, agenda: &str) -> Self {
        let agenda = agenda.trim();
        self.agenda = (!agenda.is_empty()).then(|| agenda.to_string());
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: MeetingSettings) -> Self {
        self.settings = Some(settings);
        self
    }
}

/// A meeting created by the backend.
#[derive(Clone, Deserialize)]
pub struct CreateMeetingResponse {
    #[serde(default)]
    pub uuid: String,
    pub id: i64,
    #[serde(default)]
    pub host_id: String,
    #[serde(default)]
    pub host_email: String,
    #[serde(default)]
    pub topic: String,
    #[serde(rename = "type", default)]
    pub kind: MeetingKind,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub created_at: String,
    /// Invite URL; its last path segment is the meeting number.
    pub join_url: String,
    /// Join password.
    #[serde(with = "secret::expose", default = "secret::empty")]
    pub password: SecretString,
    #[serde(with = "secret::expose", default = "secret::empty")]
    pub h323_password: SecretString,
    #[serde(with = "secret::expose", default = "secret::empty")]
    pub pstn_password: SecretString,
    #[serde(with = "secret::expose", default = "secret::empty")]
    pub encrypted_password: SecretString,
    #[serde(default)]
    pub settings: Option<MeetingSettings>,
}

impl std::fmt::Debug for CreateMeetingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateMeetingResponse")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("start_time", &self.start_time)
            .field("join_url", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Request a join signature.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`]; the notice has already been published.
    #[instrument(skip_all, fields(meeting_number = %request.meeting_number))]
    pub async fn generate_signature(
        &self,
        path: &str,
        request: &SignatureRequest,
    ) -> Result<SignatureResponse, GatewayError> {
        self.post(path, request).await
    }

    /// Fetch the server configuration.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`]; the notice has already been published.
    pub async fn server_config(&self) -> Result<ServerConfig, GatewayError> {
        self.get(CONFIG_PATH).await
    }

    /// Create a meeting.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`]; the notice has already been published.
    #[instrument(skip_all, fields(topic = %request.topic, kind = ?request.kind))]
    pub async fn create_meeting(
        &self,
        request: &CreateMeetingRequest,
    ) -> Result<CreateMeetingResponse, GatewayError> {
        self.post(MEETINGS_PATH, request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    #[test]
    fn test_signature_request_wire_format() {
        let request = SignatureRequest {
            meeting_number: "85746065432".to_string(),
            role: Role::Attendee,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"meetingNumber":"85746065432","role":0}"#);
    }

    #[test]
    fn test_signature_response_debug_redacts() {
        let response: SignatureResponse =
            serde_json::from_str(r#"{"signature":"eyJhbGciOi.secret"}"#).unwrap();

        assert_eq!(response.signature.expose_secret(), "eyJhbGciOi.secret");
        assert!(!format!("{response:?}").contains("eyJhbGciOi"));
    }

    #[test]
    fn test_server_config_defaults_missing_fields() {
        let config: ServerConfig = serde_json::from_str(r#"{"disable_join_meeting":true}"#).unwrap();

        assert!(config.disable_join_meeting);
        assert!(config.zoom_api_key.is_empty());
        assert!(!config.join_by_invite_enabled());
    }

    #[test]
    fn test_instant_meeting_wire_format() {
        let request = CreateMeetingRequest::instant("Weekly sync")
            .with_password("  ")
            .with_agenda("");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"topic": "Weekly sync", "type": 1}));
    }

    #[test]
    fn test_scheduled_meeting_wire_format() {
        let request = CreateMeetingRequest::scheduled(
            "Planning",
            "2026-10-20T02:00:00.000Z",
            45,
            "Asia/Shanghai",
        )
        .with_password(" 9876 ")
        .with_agenda(" Q4 roadmap ")
        .with_settings(MeetingSettings {
            waiting_room: Some(true),
            ..MeetingSettings::default()
        });

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "topic": "Planning",
                "type": 2,
                "start_time": "2026-10-20T02:00:00.000Z",
                "duration": 45,
                "timezone": "Asia/Shanghai",
                "password": "9876",
                "agenda": "Q4 roadmap",
                "settings": {"waiting_room": true}
            })
        );
        assert!(!format!("{request:?}").contains("9876"));
    }

    #[test]
    fn test_create_meeting_response_decodes_backend_shape() {
        let response: CreateMeetingResponse = serde_json::from_value(serde_json::json!({
            "uuid": "hWl2pGx0Q2a7",
            "id": 85_746_065_432_i64,
            "host_id": "h1",
            "host_email": "host@example.com",
            "topic": "Weekly sync",
            "type": 1,
            "status": "waiting",
            "start_time": "2026-10-19T08:00:00Z",
            "duration": 60,
            "timezone": "Asia/Shanghai",
            "created_at": "2026-10-19T08:00:00Z",
            "join_url": "https://us05web.zoom.us/j/85746065432?pwd=enc",
            "password": "a1b2c3",
            "h323_password": "123456",
            "pstn_password": "123456",
            "encrypted_password": "enc",
            "settings": {"host_video": true}
        }))
        .unwrap();

        assert_eq!(response.id, 85_746_065_432);
        assert_eq!(response.kind, MeetingKind::Instant);
        assert_eq!(response.password.expose_secret(), "a1b2c3");
        assert_eq!(response.settings.unwrap().host_video, Some(true));
    }

    #[test]
    fn test_unknown_meeting_kind_rejected() {
        assert_eq!(MeetingKind::try_from(8), Err(UnknownMeetingKind(8)));
    }
}
