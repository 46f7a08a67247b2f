use crate::error::WrapResult;
use crate::wrap::key::{import_public_key, EncryptOnlyKey, KeyPolicy};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;

/// Cache key: SHA-256 of the PEM text, so PEM bodies are not kept around as map keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PemDigest([u8; 32]);

impl PemDigest {
    pub fn of(pem_text: &str) -> Self {
        Self(Sha256::digest(pem_text.as_bytes()).into())
    }
}

/// Imported keys, keyed by the PEM text they came from.
///
/// Entries are never modified once inserted. Imports happen outside the map's
/// locks, so two requests racing on the same new PEM both import and one
/// insert wins.
pub struct KeyCache {
    keys: DashMap<PemDigest, Arc<EncryptOnlyKey>>,
    policy: KeyPolicy,
    max_entries: usize,
}

impl KeyCache {
    pub fn new(policy: KeyPolicy, max_entries: usize) -> Self {
        Self {
            keys: DashMap::new(),
            policy,
            max_entries: max_entries.max(1),
        }
    }

    /// Get a previously imported key
    pub fn get(&self, pem_text: &str) -> Option<Arc<EncryptOnlyKey>> {
        self.keys
            .get(&PemDigest::of(pem_text))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Get the key for `pem_text`, importing it on a miss
    pub fn get_or_import(&self, pem_text: &str) -> WrapResult<Arc<EncryptOnlyKey>> {
        let digest = PemDigest::of(pem_text);
        if let Some(entry) = self.keys.get(&digest) {
            return Ok(Arc::clone(entry.value()));
        }

        let key = Arc::new(import_public_key(pem_text, &self.policy)?);
        debug!(fingerprint = %key.fingerprint(), "Caching imported key");

        self.make_room();
        let entry = self.keys.entry(digest).or_insert(key);
        Ok(Arc::clone(entry.value()))
    }

    fn make_room(&self) {
        if self.keys.len() < self.max_entries {
            return;
        }

        // Simple eviction: drop a tenth of the entries, at least one
        let keys_to_remove: Vec<_> = self
            .keys
            .iter()
            .take((self.max_entries / 10).max(1))
            .map(|r| *r.key())
            .collect();
        for key in keys_to_remove {
            self.keys.remove(&key);
        }
    }

    /// Get current cache size
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Clear all entries
    pub fn clear(&self) {
        self.keys.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.keys.len(),
            max_entries: self.max_entries,
            min_modulus_bits: self.policy.min_modulus_bits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub min_modulus_bits: usize,
}
