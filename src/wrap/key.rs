//! Encrypt-only RSA-OAEP public keys.

use crate::error::{WrapError, WrapResult};
use crate::wrap::codec::encode_hex;
use crate::wrap::pem::{decode_pem, PUBLIC_KEY_LABEL};
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;

/// Smallest modulus accepted unless configured otherwise.
pub const DEFAULT_MIN_MODULUS_BITS: usize = 2048;

/// Output size of SHA-256, the OAEP hash.
pub(crate) const OAEP_HASH_LEN: usize = 32;

fn default_min_modulus_bits() -> usize {
    DEFAULT_MIN_MODULUS_BITS
}

/// Import policy for provider keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct KeyPolicy {
    #[serde(default = "default_min_modulus_bits")]
    pub min_modulus_bits: usize,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self {
            min_modulus_bits: default_min_modulus_bits(),
        }
    }
}

/// An RSA public key that can only wrap secrets with RSA-OAEP/SHA-256.
///
/// There is no way to decrypt, sign or get the key back out of this type:
///
/// ```compile_fail
/// use keywrap::wrap::EncryptOnlyKey;
///
/// fn unwrap_secret(key: &EncryptOnlyKey, ciphertext: &[u8]) -> Vec<u8> {
///     key.decrypt(ciphertext).unwrap()
/// }
/// ```
///
/// ```compile_fail
/// use keywrap::wrap::EncryptOnlyKey;
///
/// fn sign_with(key: &EncryptOnlyKey) {
///     let _ = key.sign(b"message");
/// }
/// ```
///
/// ```compile_fail
/// use keywrap::wrap::EncryptOnlyKey;
///
/// fn export(key: &EncryptOnlyKey) -> rsa::RsaPublicKey {
///     key.public_key().clone()
/// }
/// ```
pub struct EncryptOnlyKey {
    inner: RsaPublicKey,
    fingerprint: [u8; 32],
}

impl EncryptOnlyKey {
    /// Build a key from SPKI DER bytes, enforcing `policy`.
    pub fn from_spki_der(der: &[u8], policy: &KeyPolicy) -> WrapResult<Self> {
        let inner =
            RsaPublicKey::from_public_key_der(der).map_err(|_| WrapError::InvalidKeyMaterial)?;

        let bits = inner.n().bits();
        if bits < policy.min_modulus_bits {
            return Err(WrapError::UnsupportedKeySize {
                bits,
                min_bits: policy.min_modulus_bits,
            });
        }

        let fingerprint: [u8; 32] = Sha256::digest(der).into();
        debug!(bits, fingerprint = %encode_hex(fingerprint), "Imported RSA-OAEP public key");

        Ok(Self { inner, fingerprint })
    }

    /// Modulus size in bits.
    pub fn modulus_bits(&self) -> usize {
        self.inner.n().bits()
    }

    /// Modulus size in bytes, which is also the ciphertext length.
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Largest plaintext OAEP can wrap with this key: `k - 2h - 2`.
    pub fn max_plaintext_len(&self) -> usize {
        self.size().saturating_sub(2 * OAEP_HASH_LEN + 2)
    }

    /// SHA-256 of the SPKI bytes, lowercase hex.
    pub fn fingerprint(&self) -> String {
        encode_hex(self.fingerprint)
    }

    pub(crate) fn public_key(&self) -> &RsaPublicKey {
        &self.inner
    }
}

impl fmt::Debug for EncryptOnlyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptOnlyKey")
            .field("bits", &self.modulus_bits())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Parse a PEM public key into an encrypt-only handle.
pub fn import_public_key(pem_text: &str, policy: &KeyPolicy) -> WrapResult<EncryptOnlyKey> {
    let der = decode_pem(pem_text, PUBLIC_KEY_LABEL)?;
    EncryptOnlyKey::from_spki_der(&der, policy)
}
