//! Error types for validation.
//!
//! Field failures ([`ValidationError`]) are data and accumulate in the error
//! list. Schema defects ([`ConfigError`]) abort validation immediately.

mod config_error;
mod validation_error;

pub use config_error::ConfigError;
pub use validation_error::{ErrorKind, ValidationError, ValidationErrors};
