//! Wire types for keywrap deliveries.
//!
//! These are the values exchanged with the collaborators around the core:
//! the page that submits an [`AdapterDescriptor`], and whatever consumes the
//! resulting [`DeliveryReceipt`]. They carry no key material beyond public
//! PEM text and never a plaintext secret.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Where the public key for a delivery comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyReference {
    /// Look the key up by the descriptor's provider id
    #[default]
    Provider,
    /// PEM text supplied inline with the descriptor
    Embedded { pem: String },
}

/// Names the provider whose key should wrap the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterDescriptor {
    /// Provider identifier, e.g. `"openai"`
    pub provider: String,
    /// Where the caller goes once the wrapped key is ready
    #[serde(default)]
    pub target_url: Option<Url>,
    #[serde(default)]
    pub key: KeyReference,
}

impl AdapterDescriptor {
    /// Descriptor whose key is resolved from the provider id.
    pub fn for_provider<S: Into<String>>(provider: S) -> Self {
        Self {
            provider: provider.into(),
            target_url: None,
            key: KeyReference::Provider,
        }
    }

    /// Descriptor carrying its own PEM public key.
    pub fn with_embedded_key<S: Into<String>, P: Into<String>>(provider: S, pem: P) -> Self {
        Self {
            provider: provider.into(),
            target_url: None,
            key: KeyReference::Embedded { pem: pem.into() },
        }
    }

    pub fn with_target(mut self, target_url: Url) -> Self {
        self.target_url = Some(target_url);
        self
    }
}

/// Successful delivery as handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub provider: String,
    /// RSA-OAEP ciphertext, lowercase hex
    pub ciphertext: String,
    /// SHA-256 of the wrapping key's SPKI bytes, lowercase hex
    pub key_fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Url>,
}

/// Coarse failure classification exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MalformedKey,
    InvalidKeyMaterial,
    UnsupportedKeySize,
    PlaintextTooLarge,
    MalformedInput,
    KeyResolutionFailed,
    IssuanceFailed,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedKey => "malformed_key",
            Self::InvalidKeyMaterial => "invalid_key_material",
            Self::UnsupportedKeySize => "unsupported_key_size",
            Self::PlaintextTooLarge => "plaintext_too_large",
            Self::MalformedInput => "malformed_input",
            Self::KeyResolutionFailed => "key_resolution_failed",
            Self::IssuanceFailed => "issuance_failed",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure report handed back instead of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub kind: FailureKind,
}
