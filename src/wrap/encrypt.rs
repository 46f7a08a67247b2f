//! RSA-OAEP encryption engine.

use crate::error::{WrapError, WrapResult};
use crate::wrap::key::EncryptOnlyKey;
use rand::rngs::OsRng;
use rsa::Oaep;
use sha2::Sha256;

/// Wrap `plaintext` with RSA-OAEP (SHA-256, MGF1-SHA-256, no label).
///
/// Every call draws fresh padding, so wrapping the same plaintext twice gives
/// two different ciphertexts of [`EncryptOnlyKey::size`] bytes.
pub fn encrypt(key: &EncryptOnlyKey, plaintext: &[u8]) -> WrapResult<Vec<u8>> {
    let max = key.max_plaintext_len();
    if plaintext.len() > max {
        return Err(WrapError::PlaintextTooLarge {
            len: plaintext.len(),
            max,
        });
    }

    key.public_key()
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|err| match err {
            rsa::Error::MessageTooLong => WrapError::PlaintextTooLarge {
                len: plaintext.len(),
                max,
            },
            _ => WrapError::Crypto,
        })
}

impl EncryptOnlyKey {
    /// Wrap `plaintext` with this key. See [`encrypt`].
    pub fn encrypt(&self, plaintext: &[u8]) -> WrapResult<Vec<u8>> {
        encrypt(self, plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrap::key::{import_public_key, KeyPolicy};
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::RsaPrivateKey;

    const RSA_2048: &str = include_str!("../../tests/fixtures/rsa2048_public.pem");
    const RSA_2048_PRIVATE: &str = include_str!("../../tests/fixtures/rsa2048_private.pem");

    fn test_key() -> EncryptOnlyKey {
        import_public_key(RSA_2048, &KeyPolicy::default()).unwrap()
    }

    fn decrypt(ciphertext: &[u8]) -> Vec<u8> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(RSA_2048_PRIVATE).unwrap();
        private_key
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .unwrap()
    }

    #[test]
    fn test_encrypt_roundtrip() {
        let key = test_key();
        let ciphertext = key.encrypt(b"sk_live_abc123").unwrap();
        assert_eq!(ciphertext.len(), 256);
        assert_eq!(decrypt(&ciphertext), b"sk_live_abc123");
    }

    #[test]
    fn test_encrypt_is_randomized() {
        let key = test_key();
        let first = encrypt(&key, b"sk_live_abc123").unwrap();
        let second = encrypt(&key, b"sk_live_abc123").unwrap();
        let third = encrypt(&key, b"sk_live_abc123").unwrap();
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_ne!(first, third);
    }

    #[test]
    fn test_max_plaintext_fits() {
        let key = test_key();
        // 256 - 2 * 32 - 2
        let plaintext = vec![0x42u8; 190];
        let ciphertext = encrypt(&key, &plaintext).unwrap();
        assert_eq!(decrypt(&ciphertext), plaintext);
    }

    #[test]
    fn test_one_past_max_is_rejected() {
        let key = test_key();
        let plaintext = vec![0x42u8; 191];
        assert!(matches!(
            encrypt(&key, &plaintext),
            Err(WrapError::PlaintextTooLarge { len: 191, max: 190 })
        ));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = test_key();
        let ciphertext = encrypt(&key, b"").unwrap();
        assert_eq!(ciphertext.len(), 256);
        assert!(decrypt(&ciphertext).is_empty());
    }
}
