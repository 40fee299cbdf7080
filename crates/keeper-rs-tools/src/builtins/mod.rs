//! Built-in tools and resources bundled with Keeper.

mod command;
mod files;
mod memory;
mod resources;
mod rules;
mod utils;
mod workspace;

use crate::{ResourceRegistry, ToolRegistry};
use log::info;
use std::sync::Arc;

pub use command::RunCommandTool;
pub use files::{ReadFileTool, WriteFileTool};
pub use memory::{
    ExportMemoriesTool, GetMemoryTool, ImportMemoriesTool, ListMemoriesTool, SearchMemoriesTool,
    StoreMemoryTool,
};
pub use resources::{
    MemoriesResource, RuleCategoriesResource, RulesResource, memories_uri, rule_categories_uri,
    rules_uri,
};
pub use rules::{
    CreateRuleTool, DeleteRuleTool, ExportRulesTool, GetRuleTool, ImportRulesTool,
    ListRuleCategoriesTool, ListRulesTool, SearchRulesTool, UpdateRuleTool,
};

/// Register all built-in tools with the provided registry.
///
/// `run_command` is only registered when `shell_enabled` is set.
pub fn register_builtin_tools(registry: &ToolRegistry, shell_enabled: bool) {
    if shell_enabled {
        registry.register(Arc::new(RunCommandTool));
    }
    registry.register(Arc::new(ReadFileTool));
    registry.register(Arc::new(WriteFileTool));

    registry.register(Arc::new(StoreMemoryTool));
    registry.register(Arc::new(SearchMemoriesTool));
    registry.register(Arc::new(GetMemoryTool));
    registry.register(Arc::new(ListMemoriesTool));
    registry.register(Arc::new(ExportMemoriesTool));
    registry.register(Arc::new(ImportMemoriesTool));

    registry.register(Arc::new(CreateRuleTool));
    registry.register(Arc::new(SearchRulesTool));
    registry.register(Arc::new(GetRuleTool));
    registry.register(Arc::new(UpdateRuleTool));
    registry.register(Arc::new(DeleteRuleTool));
    registry.register(Arc::new(ListRulesTool));
    registry.register(Arc::new(ListRuleCategoriesTool));
    registry.register(Arc::new(ExportRulesTool));
    registry.register(Arc::new(ImportRulesTool));
    info!(
        "registered built-in tools (count={}, shell_enabled={})",
        registry.len(),
        shell_enabled
    );
}

/// Build a registry pre-populated with built-in tools.
pub fn builtin_tool_registry(shell_enabled: bool) -> ToolRegistry {
    let registry = ToolRegistry::new();
    register_builtin_tools(&registry, shell_enabled);
    registry
}

/// Register the store snapshot resources.
pub fn register_builtin_resources(registry: &ResourceRegistry) {
    registry.register(Arc::new(MemoriesResource::default()));
    registry.register(Arc::new(RulesResource::default()));
    registry.register(Arc::new(RuleCategoriesResource::default()));
}

/// Build a resource registry pre-populated with the store resources.
pub fn builtin_resource_registry() -> ResourceRegistry {
    let registry = ResourceRegistry::new();
    register_builtin_resources(&registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::{builtin_resource_registry, builtin_tool_registry};
    use pretty_assertions::assert_eq;

    #[test]
    fn shell_tool_follows_flag() {
        let with_shell = builtin_tool_registry(true);
        assert!(with_shell.get("run_command").is_some());
        assert_eq!(with_shell.len(), 18);

        let without_shell = builtin_tool_registry(false);
        assert!(without_shell.get("run_command").is_none());
        assert_eq!(without_shell.len(), 17);
    }

    #[test]
    fn every_tool_has_an_object_schema() {
        for spec in builtin_tool_registry(true).specs() {
            assert_eq!(spec.args_schema["type"], "object", "tool {}", spec.name);
            assert!(!spec.description.is_empty());
        }
    }

    #[test]
    fn resources_are_registered() {
        let registry = builtin_resource_registry();
        let uris = registry
            .specs()
            .into_iter()
            .map(|spec| spec.uri)
            .collect::<Vec<_>>();
        assert_eq!(
            uris,
            vec!["keeper://memories", "keeper://rules", "keeper://rules/categories"]
        );
    }
}
