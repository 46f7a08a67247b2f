//! Asymmetric key wrapping for provisioned secrets.
//!
//! This module turns a provider's PEM public key into an encrypt-only handle
//! and uses it to wrap a secret so the result can travel through form fields,
//! URLs and JSON without exposing the plaintext.
//!
//! ## Security Model
//!
//! - Keys are RSA public keys in SPKI form, at least 2048 bits by default
//! - Encryption is RSA-OAEP with SHA-256 for both the hash and MGF1, no label
//! - OAEP padding is drawn from the OS RNG on every call
//! - The key handle has no decrypt, sign or export operation
//! - Ciphertext only leaves this module as lowercase hex
//!
//! ## Usage
//!
//! ```ignore
//! let key = import_public_key(&pem_text, &KeyPolicy::default())?;
//! let ciphertext = key.encrypt(b"sk_live_abc123")?;
//! let wire = encode_hex(&ciphertext);
//! ```

pub mod cache;
pub mod codec;
pub mod encrypt;
pub mod key;
pub mod pem;

pub use cache::{CacheStats, KeyCache};
pub use codec::{decode_hex, encode_hex};
pub use encrypt::encrypt;
pub use key::{import_public_key, EncryptOnlyKey, KeyPolicy, DEFAULT_MIN_MODULUS_BITS};
pub use pem::{decode_pem, PUBLIC_KEY_LABEL};
