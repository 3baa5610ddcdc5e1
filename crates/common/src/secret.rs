//! Secret types for credentials that must never reach a log line.
//!
//! Re-exports [`secrecy`] and adds serde helpers for fields that have to be
//! written back out verbatim, such as the join secret stored in the session
//! descriptor. `secrecy` only implements `Deserialize` for `SecretString`, so
//! persisting one requires an explicit opt-in at the field level:
//!
//! ```rust
//! use common::secret::{self, SecretString};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct JoinSecret {
//!     #[serde(with = "secret::expose")]
//!     password: SecretString,
//! }
//!
//! let parsed: JoinSecret = serde_json::from_str(r#"{"password":"123456"}"#).unwrap();
//! assert!(format!("{parsed:?}").contains("REDACTED"));
//! assert_eq!(serde_json::to_string(&parsed).unwrap(), r#"{"password":"123456"}"#);
//! ```
//!
//! Use `SecretString` for join passwords, SDK signatures, registrant/zak
//! tokens and the ambient identity token.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};

/// An empty secret, for `#[serde(default = ...)]` on optional-in-practice fields.
#[must_use]
pub fn empty() -> SecretString {
    SecretString::from("")
}

/// Serde adapter that writes the exposed value of a `SecretString`.
pub mod expose {
    use super::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize the secret as a plain string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(secret.expose_secret())
    }

    /// Deserialize a plain string into a secret.
    ///
    /// # Errors
    ///
    /// Propagates deserializer errors.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
        String::deserialize(deserializer).map(SecretString::from)
    }
}

/// Serde adapter for `Option<SecretString>`; `null` and absent both map to `None`.
pub mod expose_option {
    use super::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize the secret as a plain string, or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        secret: &Option<SecretString>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match secret {
            Some(value) => serializer.serialize_some(value.expose_secret()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional plain string; empty strings become `None`.
    ///
    /// # Errors
    ///
    /// Propagates deserializer errors.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SecretString>, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?
            .filter(|value| !value.is_empty())
            .map(SecretString::from))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Tokens {
        #[serde(with = "expose")]
        password: SecretString,
        #[serde(default, with = "expose_option")]
        zak: Option<SecretString>,
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("meeting-pass");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("meeting-pass"));
    }

    #[test]
    fn test_round_trip_writes_exposed_values() {
        let json = r#"{"password":"pw","zak":"zak-token"}"#;
        let tokens: Tokens = serde_json::from_str(json).unwrap();

        assert_eq!(tokens.password.expose_secret(), "pw");
        assert_eq!(serde_json::to_string(&tokens).unwrap(), json);
    }

    #[test]
    fn test_optional_secret_absent_null_and_empty() {
        let absent: Tokens = serde_json::from_str(r#"{"password":"pw"}"#).unwrap();
        assert!(absent.zak.is_none());

        let null: Tokens = serde_json::from_str(r#"{"password":"pw","zak":null}"#).unwrap();
        assert!(null.zak.is_none());

        let empty: Tokens = serde_json::from_str(r#"{"password":"pw","zak":""}"#).unwrap();
        assert!(empty.zak.is_none());
    }

    #[test]
    fn test_struct_debug_hides_every_secret() {
        let tokens = Tokens {
            password: SecretString::from("hunter2"),
            zak: Some(SecretString::from("zak-123")),
        };

        let debug = format!("{tokens:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("zak-123"));
    }

    #[test]
    fn test_empty_secret() {
        assert!(empty().expose_secret().is_empty());
    }
}
