//! Builds the shared tool services from the effective configuration.

use keeper_rs_config::{ConfigError, KeeperConfig};
use keeper_rs_store::{FsStorage, MemoryStore, RuleStore, RuleStoreOptions, SystemClock};
use keeper_rs_tools::{ToolOutputPolicy, ToolServices};
use log::info;
use std::path::Path;
use std::sync::Arc;

/// Open both stores on the local filesystem and wire them into tool services.
///
/// `cwd` is where commands run by default; the workspace root comes from
/// `tools.workspace_root` or falls back to `cwd`.
pub fn build_services(config: &KeeperConfig, cwd: &Path) -> Result<ToolServices, ConfigError> {
    let memory_path = config.memory_path()?;
    let rules_path = config.rules_path()?;
    let workspace_root = config.workspace_root(cwd)?;
    info!(
        "opening stores (memory={}, rules={}, workspace={})",
        memory_path.display(),
        rules_path.display(),
        workspace_root.display()
    );

    let storage = Arc::new(FsStorage);
    let clock = Arc::new(SystemClock);
    let memory = MemoryStore::open(memory_path, storage.clone(), clock.clone());
    let rules = RuleStore::open(
        rules_path,
        storage,
        clock,
        RuleStoreOptions {
            id_strategy: config.rules.id_strategy,
            seed_defaults: config.rules.seed_defaults,
        },
    );

    let mut services = ToolServices::new(workspace_root)
        .with_memory(memory)
        .with_rules(rules)
        .with_output_policy(ToolOutputPolicy::from(&config.tools.output_policy));
    services.cwd = cwd.to_path_buf();
    services.memory_limit = config.memory.default_limit;
    services.rule_limit = config.rules.default_limit;
    Ok(services)
}
