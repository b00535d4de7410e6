//! Credentials held in settings.
//!
//! Keys never appear in `Debug` or `Display` output, so whole settings
//! structs can be logged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A backend credential, serialized as a plain string
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw key, for building request headers only
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value, or `None` for an empty key
    pub fn bearer(&self) -> Option<String> {
        (!self.0.is_empty()).then(|| format!("Bearer {}", self.0))
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_hidden_from_formatting() {
        let secret = SecretString::new("hf_abcdefghijklmnop");
        assert_eq!(format!("{:?}", secret), "SecretString(***)");
        assert_eq!(secret.to_string(), "***");
        assert_eq!(secret.expose_secret(), "hf_abcdefghijklmnop");
    }

    #[test]
    fn test_bearer_skips_empty_key() {
        assert_eq!(SecretString::new("").bearer(), None);
        assert_eq!(SecretString::from("k").bearer(), Some("Bearer k".to_string()));
    }

    #[test]
    fn test_serializes_transparently() {
        let secret = SecretString::new("value");
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"value\"");
    }
}
