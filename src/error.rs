use keywrap_types::{FailureKind, FailureReport};
use thiserror::Error;

/// Errors raised while wrapping and delivering a secret.
///
/// Messages stay coarse on purpose: none of them carries plaintext, PEM
/// bodies or the details of how a key was looked up.
#[derive(Error, Debug)]
pub enum WrapError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Malformed PEM public key")]
    MalformedKey,

    #[error("Invalid RSA public key material")]
    InvalidKeyMaterial,

    #[error("Unsupported key size: {bits} bits (minimum {min_bits})")]
    UnsupportedKeySize { bits: usize, min_bits: usize },

    #[error("Plaintext too large: {len} bytes (maximum {max})")]
    PlaintextTooLarge { len: usize, max: usize },

    #[error("Malformed hex input")]
    MalformedInput,

    #[error("Key resolution failed")]
    KeyResolutionFailed,

    #[error("Secret issuance failed")]
    IssuanceFailed,

    #[error("Cryptographic operation failed")]
    Crypto,
}

impl WrapError {
    /// The failure kind a caller is allowed to see.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Config(_) => FailureKind::KeyResolutionFailed,
            Self::MalformedKey => FailureKind::MalformedKey,
            Self::InvalidKeyMaterial => FailureKind::InvalidKeyMaterial,
            Self::UnsupportedKeySize { .. } => FailureKind::UnsupportedKeySize,
            Self::PlaintextTooLarge { .. } => FailureKind::PlaintextTooLarge,
            Self::MalformedInput => FailureKind::MalformedInput,
            Self::KeyResolutionFailed => FailureKind::KeyResolutionFailed,
            Self::IssuanceFailed => FailureKind::IssuanceFailed,
            Self::Crypto => FailureKind::Internal,
        }
    }

    /// Wire form of this error, with nothing beyond the kind.
    pub fn report(&self) -> FailureReport {
        FailureReport { kind: self.kind() }
    }
}

/// Result type alias using WrapError
pub type WrapResult<T> = Result<T, WrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(WrapError::MalformedKey.to_string(), "Malformed PEM public key");
        assert_eq!(
            WrapError::UnsupportedKeySize { bits: 1024, min_bits: 2048 }.to_string(),
            "Unsupported key size: 1024 bits (minimum 2048)"
        );
        assert_eq!(
            WrapError::PlaintextTooLarge { len: 191, max: 190 }.to_string(),
            "Plaintext too large: 191 bytes (maximum 190)"
        );
        assert_eq!(WrapError::KeyResolutionFailed.to_string(), "Key resolution failed");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(WrapError::MalformedInput.kind(), FailureKind::MalformedInput);
        assert_eq!(WrapError::IssuanceFailed.kind(), FailureKind::IssuanceFailed);
        assert_eq!(WrapError::Crypto.kind(), FailureKind::Internal);

        let config_err = WrapError::from(config::ConfigError::NotFound("providers".to_string()));
        assert_eq!(config_err.kind(), FailureKind::KeyResolutionFailed);
    }

    #[test]
    fn test_report_carries_only_kind() {
        let report = WrapError::PlaintextTooLarge { len: 191, max: 190 }.report();
        assert_eq!(report, FailureReport { kind: FailureKind::PlaintextTooLarge });
    }
}
