//! Per-server credential keys and opaque secret values.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a credential key, matching `VARCHAR(255)`.
const MAX_CREDENTIAL_KEY_LENGTH: usize = 255;

/// Name of the environment variable a credential is injected as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialKey(String);

impl CredentialKey {
    /// Creates a validated credential key.
    ///
    /// Keys follow environment variable naming: a letter or underscore
    /// followed by letters, digits, or underscores.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::InvalidCredentialKey`] for any other
    /// input and [`ToolRegistryDomainError::CredentialKeyTooLong`] past 255
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let normalized = value.into().trim().to_owned();
        let mut characters = normalized.chars();
        let valid_head = characters
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
        let valid_tail =
            characters.all(|character| character.is_ascii_alphanumeric() || character == '_');

        if !(valid_head && valid_tail) {
            return Err(ToolRegistryDomainError::InvalidCredentialKey(normalized));
        }
        if normalized.len() > MAX_CREDENTIAL_KEY_LENGTH {
            return Err(ToolRegistryDomainError::CredentialKeyTooLong(normalized));
        }
        Ok(Self(normalized))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CredentialKey {
    type Error = ToolRegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CredentialKey> for String {
    fn from(value: CredentialKey) -> Self {
        value.0
    }
}

impl AsRef<str> for CredentialKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Secret value encrypted by the caller before it reaches storage.
///
/// The registry stores and returns the ciphertext unchanged and never
/// decrypts it.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedSecret(String);

impl EncryptedSecret {
    /// Wraps caller-encrypted ciphertext.
    #[must_use]
    pub fn new(ciphertext: impl Into<String>) -> Self {
        Self(ciphertext.into())
    }

    /// Returns the ciphertext.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper, returning the ciphertext.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for EncryptedSecret {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("EncryptedSecret(<redacted>)")
    }
}
