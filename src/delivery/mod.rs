//! Delivery of wrapped secrets to an already-authorized caller.
//!
//! The orchestrator ties the external collaborators to the wrapping core:
//!
//! - a [`KeyResolver`] finds the provider's PEM public key
//! - a [`SecretIssuer`] produces the plaintext secret
//! - the secret is wrapped with RSA-OAEP, hex-encoded and packaged with the
//!   caller's next destination
//!
//! ## Usage
//!
//! ```ignore
//! let config = AppConfig::load()?;
//! let orchestrator = DeliveryOrchestrator::new(
//!     ConfiguredKeyResolver::from_config(&config),
//!     issuer,
//!     &config,
//! );
//!
//! let delivery = orchestrator.deliver(&descriptor, &caller).await?;
//! let receipt = DeliveryReceipt::from(delivery);
//! ```

pub mod issuer;
pub mod orchestrator;
pub mod resolver;
pub mod secret;

pub use issuer::{CallerContext, SecretIssuer, StaticSecretIssuer};
pub use orchestrator::{Delivery, DeliveryOrchestrator, DeliveryState};
pub use resolver::{ConfiguredKeyResolver, KeyResolver};
pub use secret::SecretBytes;
