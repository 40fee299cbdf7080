//! Read-only snapshots of the stores, exposed as resources.

use crate::{Resource, ToolContext};
use async_trait::async_trait;
use keeper_rs_protocol::{RESOURCE_SCHEME, ToolError};
use keeper_rs_store::RecordFilter;

/// `keeper://memories`
pub fn memories_uri() -> String {
    format!("{RESOURCE_SCHEME}://memories")
}

/// `keeper://rules`
pub fn rules_uri() -> String {
    format!("{RESOURCE_SCHEME}://rules")
}

/// `keeper://rules/categories`
pub fn rule_categories_uri() -> String {
    format!("{RESOURCE_SCHEME}://rules/categories")
}

/// Every stored memory as an export document.
#[derive(Debug)]
pub struct MemoriesResource {
    uri: String,
}

impl Default for MemoriesResource {
    fn default() -> Self {
        Self { uri: memories_uri() }
    }
}

#[async_trait]
impl Resource for MemoriesResource {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn name(&self) -> &str {
        "memories"
    }

    fn description(&self) -> &str {
        "All stored memories as an export document"
    }

    async fn read(&self, ctx: &ToolContext) -> Result<String, ToolError> {
        let store = ctx.memory_store()?.lock();
        Ok(store.export_json(&RecordFilter::default())?)
    }
}

/// Every rule as an export document.
#[derive(Debug)]
pub struct RulesResource {
    uri: String,
}

impl Default for RulesResource {
    fn default() -> Self {
        Self { uri: rules_uri() }
    }
}

#[async_trait]
impl Resource for RulesResource {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn name(&self) -> &str {
        "rules"
    }

    fn description(&self) -> &str {
        "All rules as an export document"
    }

    async fn read(&self, ctx: &ToolContext) -> Result<String, ToolError> {
        let store = ctx.rule_store()?.lock();
        Ok(store.export_json(&RecordFilter::default())?)
    }
}

/// Category index summary.
#[derive(Debug)]
pub struct RuleCategoriesResource {
    uri: String,
}

impl Default for RuleCategoriesResource {
    fn default() -> Self {
        Self {
            uri: rule_categories_uri(),
        }
    }
}

#[async_trait]
impl Resource for RuleCategoriesResource {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn name(&self) -> &str {
        "rule-categories"
    }

    fn description(&self) -> &str {
        "Rule categories with descriptions and rule counts"
    }

    async fn read(&self, ctx: &ToolContext) -> Result<String, ToolError> {
        let store = ctx.rule_store()?.lock();
        Ok(store.categories_json()?)
    }
}
