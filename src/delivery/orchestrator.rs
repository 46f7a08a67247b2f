//! Delivery state machine.
//!
//! `Received -> KeyResolved -> Encrypted -> Encoded -> Delivered`, or
//! `Failed(kind)` from any step. A delivery either completes or returns an
//! error; nothing partial is handed back.

use crate::config::AppConfig;
use crate::delivery::issuer::{CallerContext, SecretIssuer};
use crate::delivery::resolver::KeyResolver;
use crate::error::{WrapError, WrapResult};
use crate::wrap::{encode_hex, encrypt, import_public_key, EncryptOnlyKey, KeyCache, KeyPolicy};
use keywrap_types::{AdapterDescriptor, DeliveryReceipt, FailureKind, KeyReference};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Where a delivery currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    Received,
    KeyResolved,
    Encrypted,
    Encoded,
    Delivered,
    Failed(FailureKind),
}

/// A completed delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub provider: String,
    /// Lowercase hex RSA-OAEP ciphertext
    pub ciphertext_hex: String,
    pub key_fingerprint: String,
    /// Next destination for the caller, carrying the ciphertext as a query parameter
    pub redirect: Option<Url>,
}

impl From<Delivery> for DeliveryReceipt {
    fn from(delivery: Delivery) -> Self {
        Self {
            provider: delivery.provider,
            ciphertext: delivery.ciphertext_hex,
            key_fingerprint: delivery.key_fingerprint,
            redirect: delivery.redirect,
        }
    }
}

/// Runs deliveries: resolve the key, issue the secret, wrap it, encode it.
///
/// One orchestrator serves many concurrent requests; the only state shared
/// between them is the optional key cache.
pub struct DeliveryOrchestrator<R, I> {
    resolver: R,
    issuer: I,
    policy: KeyPolicy,
    cache: Option<Arc<KeyCache>>,
    redirect_param: String,
}

impl<R: KeyResolver, I: SecretIssuer> DeliveryOrchestrator<R, I> {
    pub fn new(resolver: R, issuer: I, config: &AppConfig) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| Arc::new(KeyCache::new(config.policy, config.cache.max_entries)));

        Self {
            resolver,
            issuer,
            policy: config.policy,
            cache,
            redirect_param: config.delivery.redirect_param.clone(),
        }
    }

    /// Share an existing key cache instead of the one built from config.
    pub fn with_cache(mut self, cache: Arc<KeyCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<KeyCache>> {
        self.cache.as_ref()
    }

    /// Deliver a wrapped secret for `descriptor`.
    ///
    /// The caller must already be authorized.
    pub async fn deliver(
        &self,
        descriptor: &AdapterDescriptor,
        caller: &CallerContext,
    ) -> WrapResult<Delivery> {
        let mut state = DeliveryState::Received;
        debug!(provider = %descriptor.provider, ?state, "Delivery received");

        match self.run(descriptor, caller, &mut state).await {
            Ok(delivery) => {
                info!(
                    provider = %delivery.provider,
                    fingerprint = %delivery.key_fingerprint,
                    "Secret delivered"
                );
                Ok(delivery)
            }
            Err(err) => {
                let failed = DeliveryState::Failed(err.kind());
                warn!(
                    provider = %descriptor.provider,
                    last_state = ?state,
                    state = ?failed,
                    "Delivery failed"
                );
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        descriptor: &AdapterDescriptor,
        caller: &CallerContext,
        state: &mut DeliveryState,
    ) -> WrapResult<Delivery> {
        let key = self.resolve_key(descriptor).await?;
        advance(state, DeliveryState::KeyResolved, descriptor);

        let secret = self.issuer.issue(descriptor, caller).await.map_err(|e| {
            debug!(provider = %descriptor.provider, error = %e, "Secret issuer failed");
            WrapError::IssuanceFailed
        })?;
        let ciphertext = encrypt(&key, secret.expose())?;
        drop(secret);
        advance(state, DeliveryState::Encrypted, descriptor);

        let ciphertext_hex = encode_hex(&ciphertext);
        advance(state, DeliveryState::Encoded, descriptor);

        let redirect = self.route(descriptor, &ciphertext_hex);
        let delivery = Delivery {
            provider: descriptor.provider.clone(),
            ciphertext_hex,
            key_fingerprint: key.fingerprint(),
            redirect,
        };
        advance(state, DeliveryState::Delivered, descriptor);

        Ok(delivery)
    }

    async fn resolve_key(&self, descriptor: &AdapterDescriptor) -> WrapResult<Arc<EncryptOnlyKey>> {
        let pem: Cow<'_, str> = match &descriptor.key {
            KeyReference::Embedded { pem } => Cow::Borrowed(pem.as_str()),
            KeyReference::Provider => {
                let pem = self.resolver.resolve(descriptor).await.map_err(|e| {
                    debug!(provider = %descriptor.provider, error = %e, "Key resolver failed");
                    WrapError::KeyResolutionFailed
                })?;
                Cow::Owned(pem)
            }
        };

        match &self.cache {
            Some(cache) => cache.get_or_import(&pem),
            None => Ok(Arc::new(import_public_key(&pem, &self.policy)?)),
        }
    }

    fn route(&self, descriptor: &AdapterDescriptor, ciphertext_hex: &str) -> Option<Url> {
        let mut url = self
            .resolver
            .redirect_for(descriptor)
            .or_else(|| descriptor.target_url.clone())?;
        url.query_pairs_mut()
            .append_pair(&self.redirect_param, ciphertext_hex);
        Some(url)
    }
}

fn advance(state: &mut DeliveryState, next: DeliveryState, descriptor: &AdapterDescriptor) {
    debug!(provider = %descriptor.provider, from = ?*state, to = ?next, "Delivery state transition");
    *state = next;
}
