use crate::delivery::secret::SecretBytes;
use crate::error::{WrapError, WrapResult};
use async_trait::async_trait;
use keywrap_types::AdapterDescriptor;

/// Identity of the caller a delivery is made for.
///
/// Authentication happens before the orchestrator runs; this is only passed
/// through to the issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    subject: String,
}

impl CallerContext {
    pub fn new<S: Into<String>>(subject: S) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Produces the secret to hand over for a descriptor.
#[async_trait]
pub trait SecretIssuer: Send + Sync {
    async fn issue(
        &self,
        descriptor: &AdapterDescriptor,
        caller: &CallerContext,
    ) -> WrapResult<SecretBytes>;
}

/// Issues the same secret to every caller.
pub struct StaticSecretIssuer {
    secret: SecretBytes,
}

impl StaticSecretIssuer {
    pub fn new(secret: SecretBytes) -> Self {
        Self { secret }
    }
}

#[async_trait]
impl SecretIssuer for StaticSecretIssuer {
    async fn issue(
        &self,
        _descriptor: &AdapterDescriptor,
        _caller: &CallerContext,
    ) -> WrapResult<SecretBytes> {
        if self.secret.is_empty() {
            return Err(WrapError::IssuanceFailed);
        }
        Ok(SecretBytes::new(self.secret.expose().to_vec()))
    }
}
