//! The `Tool` seam between MCP dispatch and the stores.

use crate::context::ToolContext;
use async_trait::async_trait;
use keeper_rs_protocol::ToolError;
use serde_json::Value;
use std::fmt::Debug;

/// What `tools/list` advertises for one tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the argument object.
    pub args_schema: Value,
}

/// A named operation invoked with a JSON argument object.
///
/// Implementations take store locks inside `call` and release them before
/// returning; a `ToolContext` is shared by concurrent calls.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn args_schema(&self) -> Value;

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError>;

    /// Whether results are trimmed and masked by the output policy.
    ///
    /// Store tools return records verbatim so exports re-import losslessly
    /// and searches honour any `limit`.
    fn applies_output_policy(&self) -> bool {
        true
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args_schema: self.args_schema(),
        }
    }
}
