use crate::{FixedClock, MemoryStorage};
use keeper_rs_protocol::IdStrategy;
use keeper_rs_store::{MemoryStore, RuleStore, RuleStoreOptions};
use keeper_rs_tools::{ToolContext, ToolServices};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Tool context rooted at `root` with no stores attached.
pub fn base_tool_context(root: impl Into<PathBuf>) -> ToolContext {
    ToolContext::new(Arc::new(ToolServices::new(root)))
}

/// Stores backed by shared in-memory storage and a fixed clock.
#[derive(Debug, Clone)]
pub struct StoreFixture {
    pub storage: Arc<MemoryStorage>,
    pub clock: Arc<FixedClock>,
    pub data_dir: PathBuf,
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreFixture {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(MemoryStorage::new()),
            clock: Arc::new(FixedClock::epoch()),
            data_dir: PathBuf::from("/keeper"),
        }
    }

    pub fn memory_path(&self) -> PathBuf {
        self.data_dir.join("memory").join("memories.json")
    }

    pub fn rules_path(&self) -> PathBuf {
        self.data_dir.join("rules").join("rules.json")
    }

    pub fn memory_store(&self) -> MemoryStore {
        MemoryStore::open(self.memory_path(), self.storage.clone(), self.clock.clone())
    }

    /// Rule store without the default seed.
    pub fn rule_store(&self, id_strategy: IdStrategy) -> RuleStore {
        self.rule_store_with(RuleStoreOptions {
            id_strategy,
            seed_defaults: false,
        })
    }

    pub fn rule_store_with(&self, options: RuleStoreOptions) -> RuleStore {
        RuleStore::open(
            self.rules_path(),
            self.storage.clone(),
            self.clock.clone(),
            options,
        )
    }

    /// Tool context with both stores attached.
    pub fn tool_context(&self, root: &Path) -> ToolContext {
        let services = ToolServices::new(root)
            .with_memory(self.memory_store())
            .with_rules(self.rule_store(IdStrategy::Monotonic));
        ToolContext::new(Arc::new(services))
    }
}
