//! MCP server exposing the Keeper tools and store resources over stdio.

mod error;
mod handler;
mod services;

pub use error::ServerError;
pub use handler::{KeeperMcpServer, run_stdio_server};
pub use services::build_services;
