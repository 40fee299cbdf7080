//! Read-only resources exposed next to the tools.

use crate::context::ToolContext;
use async_trait::async_trait;
use keeper_rs_protocol::ToolError;
use std::fmt::Debug;

/// Resource metadata for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// A resource addressed by a fixed URI and rendered as text on read.
#[async_trait]
pub trait Resource: Send + Sync + Debug {
    /// Absolute URI, e.g. `keeper://rules`.
    fn uri(&self) -> &str;
    /// Short display name.
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn mime_type(&self) -> &str {
        "application/json"
    }

    /// Render the current contents.
    async fn read(&self, ctx: &ToolContext) -> Result<String, ToolError>;

    fn spec(&self) -> ResourceSpec {
        ResourceSpec {
            uri: self.uri().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            mime_type: self.mime_type().to_string(),
        }
    }
}
