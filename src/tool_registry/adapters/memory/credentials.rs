//! In-memory credential injector.

use crate::tool_registry::{
    domain::{CredentialKey, ServerEnv, ServerId},
    ports::{CredentialInjectionError, CredentialInjectionResult, CredentialInjector},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Credential injector backed by plaintext secrets held in memory.
///
/// Declared variables with a known secret are replaced by it. All other
/// variables pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialInjector {
    secrets: Arc<RwLock<HashMap<(ServerId, CredentialKey), String>>>,
}

impl InMemoryCredentialInjector {
    /// Creates an injector with no secrets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the secret substituted for `key` on `server_id`.
    ///
    /// # Errors
    ///
    /// Returns injector runtime errors when lock acquisition fails.
    pub fn set_secret(
        &self,
        server_id: ServerId,
        key: CredentialKey,
        secret: impl Into<String>,
    ) -> CredentialInjectionResult<()> {
        let mut secrets = self.secrets.write().map_err(|err| {
            CredentialInjectionError::runtime(std::io::Error::other(err.to_string()))
        })?;
        secrets.insert((server_id, key), secret.into());
        Ok(())
    }
}

#[async_trait]
impl CredentialInjector for InMemoryCredentialInjector {
    async fn inject_credentials(
        &self,
        server_id: ServerId,
        declared_env: &ServerEnv,
    ) -> CredentialInjectionResult<ServerEnv> {
        let secrets = self.secrets.read().map_err(|err| {
            CredentialInjectionError::runtime(std::io::Error::other(err.to_string()))
        })?;

        Ok(declared_env
            .iter()
            .map(|(name, value)| {
                let secret = CredentialKey::new(name.as_str())
                    .ok()
                    .and_then(|key| secrets.get(&(server_id, key)));
                let resolved = secret.map_or_else(|| value.clone(), Clone::clone);
                (name.clone(), resolved)
            })
            .collect())
    }
}
