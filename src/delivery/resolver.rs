use crate::config::{AppConfig, ProviderConfig};
use crate::error::{WrapError, WrapResult};
use async_trait::async_trait;
use keywrap_types::AdapterDescriptor;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Finds the PEM public key for a descriptor's provider.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// PEM text of the provider's public key.
    async fn resolve(&self, descriptor: &AdapterDescriptor) -> WrapResult<String>;

    /// Where the caller should be sent instead of the descriptor's target.
    fn redirect_for(&self, _descriptor: &AdapterDescriptor) -> Option<Url> {
        None
    }
}

/// Resolves keys from the `providers` configuration table.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredKeyResolver {
    providers: HashMap<String, ProviderConfig>,
}

impl ConfiguredKeyResolver {
    pub fn new(providers: HashMap<String, ProviderConfig>) -> Self {
        Self { providers }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.providers.clone())
    }
}

#[async_trait]
impl KeyResolver for ConfiguredKeyResolver {
    async fn resolve(&self, descriptor: &AdapterDescriptor) -> WrapResult<String> {
        let provider = self.providers.get(&descriptor.provider).ok_or_else(|| {
            debug!(provider = %descriptor.provider, "No key configured for provider");
            WrapError::KeyResolutionFailed
        })?;

        if let Some(pem) = &provider.public_key_pem {
            return Ok(pem.clone());
        }

        let Some(path) = &provider.public_key_path else {
            debug!(provider = %descriptor.provider, "Provider has neither inline key nor key path");
            return Err(WrapError::KeyResolutionFailed);
        };

        tokio::fs::read_to_string(path).await.map_err(|e| {
            debug!(provider = %descriptor.provider, error = %e, "Failed to read provider key file");
            WrapError::KeyResolutionFailed
        })
    }

    fn redirect_for(&self, descriptor: &AdapterDescriptor) -> Option<Url> {
        self.providers.get(&descriptor.provider)?.redirect.clone()
    }
}
