use keeper_rs_config::ConfigError;
use thiserror::Error;

/// Errors raised while assembling or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The MCP transport failed to start or terminated abnormally.
    #[error("transport error: {0}")]
    Transport(String),
}
