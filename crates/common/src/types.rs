//! Common data types shared by the meeting session crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier the conferencing provider assigns to a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role requested when joining a meeting. Encoded on the wire as `0`/`1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    /// Regular participant (`0`).
    #[default]
    Attendee,
    /// Meeting host (`1`).
    Host,
}

/// Unknown numeric role.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub u8);

impl TryFrom<u8> for Role {
    type Error = UnknownRole;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::Attendee),
            1 => Ok(Role::Host),
            other => Err(UnknownRole(other)),
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        match role {
            Role::Attendee => 0,
            Role::Host => 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Attendee).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Role::Host).unwrap(), "1");
        assert_eq!(serde_json::from_str::<Role>("1").unwrap(), Role::Host);
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(serde_json::from_str::<Role>("7").is_err());
        assert_eq!(Role::try_from(2), Err(UnknownRole(2)));
    }

    #[test]
    fn test_user_id_is_transparent() {
        assert_eq!(serde_json::to_string(&UserId(16_778_240)).unwrap(), "16778240");
        assert_eq!(UserId(42).to_string(), "42");
    }
}
