//! Configuration schema for Keeper.

use crate::ConfigError;
use directories::UserDirs;
use keeper_rs_protocol::IdStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory under the home directory holding user config and data.
pub const KEEPER_HOME_DIR: &str = ".keeper";
/// Memory snapshot location relative to the data directory.
pub const MEMORY_FILE: &str = "memory/memories.json";
/// Rule snapshot location relative to the data directory.
pub const RULES_FILE: &str = "rules/rules.json";

/// Root config for Keeper.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeeperConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl KeeperConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> KeeperConfigBuilder {
        KeeperConfigBuilder::new()
    }

    /// Resolved data directory (`~/.keeper` unless configured).
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match self.storage.data_dir.as_deref() {
            Some(dir) => expand_home(dir),
            None => home_dir().map(|home| home.join(KEEPER_HOME_DIR)),
        }
    }

    /// Backing file for the memory store.
    pub fn memory_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join(MEMORY_FILE))
    }

    /// Backing file for the rule store.
    pub fn rules_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join(RULES_FILE))
    }

    /// Workspace root for file and shell tools, resolved against `cwd`.
    pub fn workspace_root(&self, cwd: &Path) -> Result<PathBuf, ConfigError> {
        match self.tools.workspace_root.as_deref() {
            Some(root) => {
                let root = expand_home(root)?;
                Ok(if root.is_absolute() { root } else { cwd.join(root) })
            }
            None => Ok(cwd.to_path_buf()),
        }
    }
}

/// Builder for assembling a `KeeperConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct KeeperConfigBuilder {
    config: KeeperConfig,
}

impl KeeperConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: KeeperConfig::default(),
        }
    }

    /// Set the data directory holding both stores.
    pub fn data_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.storage.data_dir = Some(dir.into());
        self
    }

    /// Replace the memory store configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the rule store configuration.
    pub fn rules(mut self, rules: RulesConfig) -> Self {
        self.config.rules = rules;
        self
    }

    /// Replace the tool configuration.
    pub fn tools(mut self, tools: ToolsConfig) -> Self {
        self.config.tools = tools;
        self
    }

    /// Finalize and return the built `KeeperConfig`.
    pub fn build(self) -> KeeperConfig {
        self.config
    }
}

/// Where store snapshots live.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Data directory; `~` expands to the home directory.
    #[serde(default)]
    pub data_dir: Option<String>,
}

/// Memory store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_search_limit(),
        }
    }
}

/// Rule store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,
    #[serde(default)]
    pub id_strategy: IdStrategy,
    /// Seed default categories and rules on first run.
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            default_limit: default_search_limit(),
            id_strategy: IdStrategy::default(),
            seed_defaults: true,
        }
    }
}

/// Tool surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Root for file and shell tools; defaults to the working directory.
    #[serde(default)]
    pub workspace_root: Option<String>,
    /// Whether `run_command` is registered.
    #[serde(default = "default_true")]
    pub shell_enabled: bool,
    #[serde(default)]
    pub output_policy: ToolOutputPolicyConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            workspace_root: None,
            shell_enabled: true,
            output_policy: ToolOutputPolicyConfig::default(),
        }
    }
}

/// Output policy for tool results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutputPolicyConfig {
    #[serde(default = "default_max_string_bytes")]
    pub max_string_bytes: usize,
    #[serde(default = "default_max_array_len")]
    pub max_array_len: usize,
    #[serde(default = "default_max_object_entries")]
    pub max_object_entries: usize,
    #[serde(default)]
    pub redact_keys: Vec<String>,
    #[serde(default)]
    pub redact_values: Vec<String>,
    #[serde(default = "default_redaction_replacement")]
    pub replacement: String,
}

impl Default for ToolOutputPolicyConfig {
    fn default() -> Self {
        Self {
            max_string_bytes: default_max_string_bytes(),
            max_array_len: default_max_array_len(),
            max_object_entries: default_max_object_entries(),
            redact_keys: Vec::new(),
            redact_values: Vec::new(),
            replacement: default_redaction_replacement(),
        }
    }
}

fn default_search_limit() -> usize {
    5
}

fn default_true() -> bool {
    true
}

/// Default maximum string size for tool output in bytes.
fn default_max_string_bytes() -> usize {
    32 * 1024
}

fn default_max_array_len() -> usize {
    256
}

fn default_max_object_entries() -> usize {
    256
}

fn default_redaction_replacement() -> String {
    "[REDACTED]".to_string()
}

fn home_dir() -> Result<PathBuf, ConfigError> {
    UserDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::HomeUnavailable)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return home_dir();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::{KeeperConfig, MemoryConfig, expand_home};
    use keeper_rs_protocol::IdStrategy;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    #[test]
    fn defaults_match_documented_values() {
        let config = KeeperConfig::default();
        assert_eq!(config.memory.default_limit, 5);
        assert_eq!(config.rules.default_limit, 5);
        assert_eq!(config.rules.id_strategy, IdStrategy::Monotonic);
        assert_eq!(config.rules.seed_defaults, true);
        assert_eq!(config.tools.shell_enabled, true);
        assert_eq!(config.tools.output_policy.replacement, "[REDACTED]");
    }

    #[test]
    fn store_paths_live_under_data_dir() {
        let config = KeeperConfig::builder().data_dir("/var/lib/keeper").build();
        assert_eq!(
            config.memory_path().expect("memory"),
            PathBuf::from("/var/lib/keeper/memory/memories.json")
        );
        assert_eq!(
            config.rules_path().expect("rules"),
            PathBuf::from("/var/lib/keeper/rules/rules.json")
        );
    }

    #[test]
    fn workspace_root_is_relative_to_cwd() {
        let mut config = KeeperConfig::builder()
            .memory(MemoryConfig { default_limit: 3 })
            .build();
        let cwd = Path::new("/work");
        assert_eq!(config.workspace_root(cwd).expect("root"), PathBuf::from("/work"));
        config.tools.workspace_root = Some("repo".to_string());
        assert_eq!(
            config.workspace_root(cwd).expect("root"),
            PathBuf::from("/work/repo")
        );
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("data").expect("plain"), PathBuf::from("data"));
        assert_eq!(expand_home("/abs").expect("abs"), PathBuf::from("/abs"));
    }
}
