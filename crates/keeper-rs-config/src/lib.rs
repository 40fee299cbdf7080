//! Configuration models and layered config loading.
//!
//! This crate owns the Keeper config schema, validation, and layer-merging
//! logic used by the binary and the tool server.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
