pub mod config;
pub mod delivery;
pub mod error;
pub mod wrap;

pub use crate::config::AppConfig;
pub use crate::error::{WrapError, WrapResult};
pub use keywrap_types::{AdapterDescriptor, DeliveryReceipt, FailureKind, KeyReference};
