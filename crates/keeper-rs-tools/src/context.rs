//! Tool execution context and shared services.

use crate::Tool;
use crate::output_policy::ToolOutputPolicy;
use keeper_rs_protocol::{StoreKind, ToolError};
use keeper_rs_store::{DEFAULT_SEARCH_LIMIT, MemoryStore, RuleStore};
use log::{debug, warn};
use parking_lot::Mutex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Memory store shared between tool calls.
pub type SharedMemoryStore = Arc<Mutex<MemoryStore>>;
/// Rule store shared between tool calls.
pub type SharedRuleStore = Arc<Mutex<RuleStore>>;

/// Service dependencies shared by every tool call (constructed once, shared via Arc).
pub struct ToolServices {
    /// Directory commands run in when no `cwd` is given.
    pub cwd: PathBuf,
    /// Root that workspace-relative paths resolve against.
    pub workspace_root: PathBuf,
    /// Output policy applied to tool results.
    pub output_policy: Option<ToolOutputPolicy>,
    /// Memory store, when enabled.
    pub memory: Option<SharedMemoryStore>,
    /// Rule store, when enabled.
    pub rules: Option<SharedRuleStore>,
    /// Search limit used when `search_memories` omits `limit`.
    pub memory_limit: usize,
    /// Search limit used when `search_rules` omits `limit`.
    pub rule_limit: usize,
}

impl ToolServices {
    /// Services rooted at `root` with no stores attached.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cwd: root.clone(),
            workspace_root: root,
            output_policy: None,
            memory: None,
            rules: None,
            memory_limit: DEFAULT_SEARCH_LIMIT,
            rule_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_memory(mut self, store: MemoryStore) -> Self {
        self.memory = Some(Arc::new(Mutex::new(store)));
        self
    }

    pub fn with_rules(mut self, store: RuleStore) -> Self {
        self.rules = Some(Arc::new(Mutex::new(store)));
        self
    }

    pub fn with_output_policy(mut self, policy: ToolOutputPolicy) -> Self {
        self.output_policy = Some(policy);
        self
    }
}

/// Context passed to tools and resources during execution.
///
/// Shared services live behind an `Arc<ToolServices>` so cloning per call is a
/// reference-count bump.
#[derive(Clone)]
pub struct ToolContext {
    /// Tool name for the current invocation.
    pub tool_name: Option<String>,
    /// Shared services.
    pub services: Arc<ToolServices>,
}

impl ToolContext {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self {
            tool_name: None,
            services,
        }
    }

    /// Apply the configured output policy to a tool result value.
    pub fn apply_output_policy(&self, value: Value) -> Value {
        match self.services.output_policy.as_ref() {
            Some(policy) => policy.apply(value),
            None => value,
        }
    }

    /// The memory store, or an error naming the missing store.
    pub fn memory_store(&self) -> Result<&SharedMemoryStore, ToolError> {
        self.services
            .memory
            .as_ref()
            .ok_or_else(|| store_unavailable(StoreKind::Memory))
    }

    /// The rule store, or an error naming the missing store.
    pub fn rule_store(&self) -> Result<&SharedRuleStore, ToolError> {
        self.services
            .rules
            .as_ref()
            .ok_or_else(|| store_unavailable(StoreKind::Rules))
    }

    /// Run a tool and pass its result through the output policy when the
    /// tool opts in.
    pub async fn execute_tool(&mut self, tool: &dyn Tool, args: Value) -> Result<Value, ToolError> {
        self.tool_name = Some(tool.name().to_string());
        debug!("executing tool (name={})", tool.name());
        match tool.call(self, args).await {
            Ok(result) if tool.applies_output_policy() => Ok(self.apply_output_policy(result)),
            Ok(result) => Ok(result),
            Err(err) => {
                warn!("tool failed (name={}): {}", tool.name(), err);
                Err(err)
            }
        }
    }
}

fn store_unavailable(kind: StoreKind) -> ToolError {
    ToolError::ExecutionFailed(format!("{kind} store is not configured"))
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("tool_name", &self.tool_name)
            .field("workspace_root", &self.services.workspace_root)
            .finish()
    }
}
