//! Plaintext secret buffers.
//!
//! A secret lives only for the request that wraps it and is zeroized when
//! dropped, whichever way the request ends.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Plaintext credential awaiting encryption.
///
/// Deliberately not `Clone`; `Debug` prints only the length.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes {
    bytes: Vec<u8>,
    /// Released together with the buffer, so tests can see when a secret is gone
    #[cfg(test)]
    #[zeroize(skip)]
    witness: Option<std::sync::Arc<()>>,
}

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            #[cfg(test)]
            witness: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn witnessed(bytes: Vec<u8>) -> (Self, std::sync::Weak<()>) {
        let witness = std::sync::Arc::new(());
        let weak = std::sync::Arc::downgrade(&witness);
        let secret = Self {
            bytes,
            witness: Some(witness),
        };
        (secret, weak)
    }

    /// Borrow the plaintext for encryption.
    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<String> for SecretBytes {
    fn from(secret: String) -> Self {
        Self::new(secret.into_bytes())
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBytes")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}
