//! Name-ordered registries for tools and resources.

use crate::resource::{Resource, ResourceSpec};
use crate::tool::{Tool, ToolSpec};
use log::debug;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Something a [`Registry`] can hold: addressable by a key and describable for listing.
pub trait Registered: Send + Sync {
    type Spec;

    /// Tool name or resource URI.
    fn key(&self) -> &str;
    fn describe(&self) -> Self::Spec;
}

impl Registered for dyn Tool {
    type Spec = ToolSpec;

    fn key(&self) -> &str {
        self.name()
    }

    fn describe(&self) -> ToolSpec {
        self.spec()
    }
}

impl Registered for dyn Resource {
    type Spec = ResourceSpec;

    fn key(&self) -> &str {
        self.uri()
    }

    fn describe(&self) -> ResourceSpec {
        self.spec()
    }
}

/// Shared map from key to implementation. Clones share the same entries.
pub struct Registry<T: ?Sized> {
    entries: Arc<RwLock<BTreeMap<String, Arc<T>>>>,
}

/// Tools keyed by name.
pub type ToolRegistry = Registry<dyn Tool>;
/// Resources keyed by URI.
pub type ResourceRegistry = Registry<dyn Resource>;

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl<T: ?Sized> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: ?Sized + Registered> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the entry's key; a later registration with the same key wins.
    pub fn register(&self, entry: Arc<T>) {
        let key = entry.key().to_string();
        debug!("registering (key={key})");
        self.entries.write().insert(key, entry);
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries.read().get(key).cloned()
    }

    /// Registered keys in sorted order.
    pub fn list(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Descriptors in key order.
    pub fn specs(&self) -> Vec<T::Spec> {
        self.entries
            .read()
            .values()
            .map(|entry| entry.describe())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ResourceRegistry, ToolRegistry};
    use crate::{Resource, Tool, ToolContext};
    use async_trait::async_trait;
    use keeper_rs_protocol::ToolError;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn args_schema(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn call(&self, _ctx: &ToolContext, _args: Value) -> Result<Value, ToolError> {
            Ok(Value::Null)
        }
    }

    #[derive(Debug)]
    struct Snapshot;

    #[async_trait]
    impl Resource for Snapshot {
        fn uri(&self) -> &str {
            "keeper://snapshot"
        }

        fn name(&self) -> &str {
            "snapshot"
        }

        fn description(&self) -> &str {
            "fixed text"
        }

        async fn read(&self, _ctx: &ToolContext) -> Result<String, ToolError> {
            Ok("{}".to_string())
        }
    }

    #[test]
    fn tools_are_listed_by_name_without_duplicates() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(Named("write_file")));
        registry.register(Arc::new(Named("get_rule")));
        registry.register(Arc::new(Named("get_rule")));

        assert_eq!(registry.list(), vec!["get_rule", "write_file"]);
        assert_eq!(registry.len(), 2);
        let names: Vec<String> = registry.specs().into_iter().map(|spec| spec.name).collect();
        assert_eq!(names, vec!["get_rule", "write_file"]);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn clones_share_entries() {
        let registry = ToolRegistry::new();
        let clone = registry.clone();
        clone.register(Arc::new(Named("search_rules")));
        assert!(registry.get("search_rules").is_some());
    }

    #[test]
    fn resources_resolve_by_uri() {
        let registry = ResourceRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(Snapshot));

        assert!(registry.get("keeper://snapshot").is_some());
        assert!(registry.get("keeper://other").is_none());
        let specs = registry.specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].mime_type, "application/json");
    }
}
