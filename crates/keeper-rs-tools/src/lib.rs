//! Tool and resource interfaces plus the built-in Keeper tools.

pub mod builtins;
pub mod context;
pub mod output_policy;
pub mod registry;
pub mod resource;
pub mod tool;

/// Built-in registries and registration helpers.
pub use builtins::{
    builtin_resource_registry, builtin_tool_registry, register_builtin_resources,
    register_builtin_tools,
};
/// Tool context and shared services.
pub use context::{SharedMemoryStore, SharedRuleStore, ToolContext, ToolServices};
/// Tool output policy.
pub use output_policy::ToolOutputPolicy;
/// Tool and resource registries.
pub use registry::{ResourceRegistry, ToolRegistry};
/// Resource trait and descriptor.
pub use resource::{Resource, ResourceSpec};
/// Tool trait and spec type.
pub use tool::{Tool, ToolSpec};
