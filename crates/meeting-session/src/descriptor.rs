//! The credential bundle needed to join one meeting, and invite-link parsing.

use common::secret::{self, ExposeSecret, SecretString};
use common::types::Role;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Query parameter carrying the join password in an invite link.
const INVITE_PASSWORD_PARAM: &str = "pwd";

/// Required descriptor fields are missing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DescriptorError {
    /// Meeting number is empty after whitespace removal.
    #[error("Meeting number is missing")]
    MissingMeetingNumber,

    /// Display name is empty or blank.
    #[error("User name is missing")]
    MissingUserName,
}

/// Everything needed to join one meeting session.
///
/// Created by the join/create flow, written once to the session store and
/// read once per controller mount.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSessionDescriptor {
    /// Meeting number as entered; whitespace is not significant.
    pub meeting_number: String,
    /// Display name inside the meeting.
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    /// Join password.
    #[serde(with = "secret::expose", default = "secret::empty")]
    pub pass_word: SecretString,
    #[serde(default)]
    pub role: Role,
    /// SDK key for the embedded client.
    #[serde(default)]
    pub api_key: String,
    /// Registrant token for webinars requiring registration.
    #[serde(
        with = "secret::expose_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub registrant_token: Option<SecretString>,
    /// Host's zak token, required to start a meeting as host.
    #[serde(
        with = "secret::expose_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub zak_token: Option<SecretString>,
}

impl std::fmt::Debug for MeetingSessionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeetingSessionDescriptor")
            .field("meeting_number", &self.meeting_number)
            .field("user_name", &self.user_name)
            .field("user_email", &self.user_email)
            .field("pass_word", &"[REDACTED]")
            .field("role", &self.role)
            .field("api_key", &self.api_key)
            .field(
                "registrant_token",
                &self.registrant_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("zak_token", &self.zak_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl MeetingSessionDescriptor {
    /// Descriptor for an attendee joining with a password.
    pub fn new(
        meeting_number: impl Into<String>,
        user_name: impl Into<String>,
        pass_word: SecretString,
    ) -> Self {
        Self {
            meeting_number: meeting_number.into(),
            user_name: user_name.into(),
            user_email: String::new(),
            pass_word,
            role: Role::Attendee,
            api_key: String::new(),
            registrant_token: None,
            zak_token: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = email.into();
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    #[must_use]
    pub fn with_registrant_token(mut self, token: SecretString) -> Self {
        self.registrant_token = Some(token);
        self
    }

    #[must_use]
    pub fn with_zak_token(mut self, token: SecretString) -> Self {
        self.zak_token = Some(token);
        self
    }

    /// Meeting number with every whitespace character removed.
    #[must_use]
    pub fn clean_meeting_number(&self) -> String {
        self.meeting_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    /// Check the fields every join needs.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.clean_meeting_number().is_empty() {
            return Err(DescriptorError::MissingMeetingNumber);
        }
        if self.user_name.trim().is_empty() {
            return Err(DescriptorError::MissingUserName);
        }
        Ok(())
    }
}

/// An invite link could not be used to join.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InviteLinkError {
    #[error("Invite link is not a valid URL")]
    InvalidUrl,

    #[error("Invite link has no meeting number")]
    MissingMeetingNumber,

    #[error("Invite link has no password")]
    MissingPassword,
}

/// Meeting number and password extracted from an invite link such as
/// `https://zoom.us/j/85746065432?pwd=abc`.
#[derive(Clone)]
pub struct InviteLink {
    pub meeting_number: String,
    pub password: SecretString,
}

impl std::fmt::Debug for InviteLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InviteLink")
            .field("meeting_number", &self.meeting_number)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl InviteLink {
    /// Parse an invite link: the last path segment is the meeting number and
    /// the `pwd` query parameter is the password.
    ///
    /// # Errors
    ///
    /// Returns `InviteLinkError` when the URL is invalid or either part is missing.
    pub fn parse(link: &str) -> Result<Self, InviteLinkError> {
        let url = Url::parse(link.trim()).map_err(|_| InviteLinkError::InvalidUrl)?;
        let meeting_number = Self::meeting_number_of(&url)?;

        let password = url
            .query_pairs()
            .find(|(key, _)| key == INVITE_PASSWORD_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .ok_or(InviteLinkError::MissingPassword)?;

        Ok(Self {
            meeting_number,
            password: SecretString::from(password),
        })
    }

    /// Meeting number of a join URL whose password travels separately, such
    /// as the `join_url` of a newly created meeting.
    ///
    /// # Errors
    ///
    /// Returns `InviteLinkError` when the URL is invalid or has no meeting number.
    pub fn meeting_number_from(link: &str) -> Result<String, InviteLinkError> {
        let url = Url::parse(link.trim()).map_err(|_| InviteLinkError::InvalidUrl)?;
        Self::meeting_number_of(&url)
    }

    fn meeting_number_of(url: &Url) -> Result<String, InviteLinkError> {
        url.path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .filter(|s| !s.is_empty())
            .ok_or(InviteLinkError::MissingMeetingNumber)
    }

    /// Build an attendee descriptor for `user_name`.
    #[must_use]
    pub fn into_descriptor(self, user_name: impl Into<String>) -> MeetingSessionDescriptor {
        MeetingSessionDescriptor::new(self.meeting_number, user_name, self.password)
    }
}

impl PartialEq for InviteLink {
    fn eq(&self, other: &Self) -> bool {
        self.meeting_number == other.meeting_number
            && self.password.expose_secret() == other.password.expose_secret()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn descriptor(meeting_number: &str, user_name: &str) -> MeetingSessionDescriptor {
        MeetingSessionDescriptor::new(meeting_number, user_name, SecretString::from("123456"))
    }

    #[test]
    fn test_clean_meeting_number_strips_all_whitespace() {
        let cases = [
            ("857 4606 5432", "85746065432"),
            ("  85746065432  ", "85746065432"),
            ("857\t460\n65432", "85746065432"),
            ("85746065432", "85746065432"),
        ];

        for (input, expected) in cases {
            assert_eq!(descriptor(input, "Alice").clean_meeting_number(), expected);
        }
    }

    #[test]
    fn test_validate_requires_meeting_number_and_name() {
        assert_eq!(descriptor("123", "Alice").validate(), Ok(()));
        assert_eq!(
            descriptor("   ", "Alice").validate(),
            Err(DescriptorError::MissingMeetingNumber)
        );
        assert_eq!(
            descriptor("123", " ").validate(),
            Err(DescriptorError::MissingUserName)
        );
    }

    #[test]
    fn test_wire_format_uses_camel_case() {
        let d = descriptor("123", "Alice")
            .with_role(Role::Host)
            .with_zak_token(SecretString::from("zak"));

        let json: serde_json::Value = serde_json::to_value(&d).unwrap();
        assert_eq!(json["meetingNumber"], "123");
        assert_eq!(json["userName"], "Alice");
        assert_eq!(json["passWord"], "123456");
        assert_eq!(json["role"], 1);
        assert_eq!(json["zakToken"], "zak");
        assert!(json.get("registrantToken").is_none());
    }

    #[test]
    fn test_optional_fields_default_when_absent() {
        let d: MeetingSessionDescriptor =
            serde_json::from_str(r#"{"meetingNumber":"123","userName":"Alice"}"#).unwrap();

        assert_eq!(d.role, Role::Attendee);
        assert!(d.pass_word.expose_secret().is_empty());
        assert!(d.registrant_token.is_none());
        assert!(d.zak_token.is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let d = descriptor("123", "Alice").with_registrant_token(SecretString::from("tk-secret"));
        let rendered = format!("{d:?}");

        assert!(!rendered.contains("123456"));
        assert!(!rendered.contains("tk-secret"));
    }

    #[test]
    fn test_invite_link_parses_number_and_password() {
        let link = InviteLink::parse("https://us05web.zoom.us/j/85746065432?pwd=aBcD.1").unwrap();

        assert_eq!(link.meeting_number, "85746065432");
        assert_eq!(link.password.expose_secret(), "aBcD.1");
    }

    #[test]
    fn test_invite_link_tolerates_trailing_slash() {
        let link = InviteLink::parse("https://zoom.us/j/123/?pwd=x").unwrap();
        assert_eq!(link.meeting_number, "123");
    }

    #[test]
    fn test_invite_link_rejects_incomplete_links() {
        assert_eq!(
            InviteLink::parse("not a link").unwrap_err(),
            InviteLinkError::InvalidUrl
        );
        assert_eq!(
            InviteLink::parse("https://zoom.us/j/123").unwrap_err(),
            InviteLinkError::MissingPassword
        );
        assert_eq!(
            InviteLink::parse("https://zoom.us/?pwd=x").unwrap_err(),
            InviteLinkError::MissingMeetingNumber
        );
    }

    #[test]
    fn test_invite_link_into_descriptor() {
        let d = InviteLink::parse("https://zoom.us/j/123?pwd=x")
            .unwrap()
            .into_descriptor("Bob");

        assert_eq!(d.meeting_number, "123");
        assert_eq!(d.user_name, "Bob");
        assert_eq!(d.role, Role::Attendee);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_meeting_number_from_join_url_without_password() {
        assert_eq!(
            InviteLink::meeting_number_from("https://us05web.zoom.us/j/85746065432").unwrap(),
            "85746065432"
        );
        assert_eq!(
            InviteLink::meeting_number_from("https://zoom.us/j/123?pwd=ignored").unwrap(),
            "123"
        );
        assert_eq!(
            InviteLink::meeting_number_from("https://zoom.us/").unwrap_err(),
            InviteLinkError::MissingMeetingNumber
        );
    }
}
