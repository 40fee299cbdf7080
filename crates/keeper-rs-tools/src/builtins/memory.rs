//! Tools over the experience-memory store.

use crate::builtins::utils::{args_schema, data_text, parse_args, record_filter, to_value};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use keeper_rs_protocol::ToolError;
use keeper_rs_store::MemoryDraft;
use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, JsonSchema)]
struct StoreMemoryArgs {
    /// Short summary of the experience.
    title: String,
    /// What happened and what was learned.
    content: String,
    /// Category, e.g. "debugging" or "deployment".
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    /// Project the memory belongs to.
    #[serde(default)]
    project: Option<String>,
    /// Free-form key/value context such as file names or error messages.
    #[serde(default)]
    context: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchMemoriesArgs {
    /// Text to look for. Also applied as a case-insensitive regular expression to the content.
    query: String,
    /// Only memories whose category contains this text.
    #[serde(default)]
    category: Option<String>,
    /// Only memories sharing at least one of these tags.
    #[serde(default)]
    tags: Option<Vec<String>>,
    /// Only memories whose project contains this text.
    #[serde(default)]
    project: Option<String>,
    /// Maximum results to return.
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct MemoryIdArgs {
    /// Memory id.
    id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListMemoriesArgs {
    /// Exact category name.
    category: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ExportMemoriesArgs {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    project: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ImportMemoriesArgs {
    /// Export document or array of memories, either as JSON or as a JSON string.
    data: Value,
}

#[derive(Debug, Default)]
pub struct StoreMemoryTool;

#[async_trait]
impl Tool for StoreMemoryTool {
    fn name(&self) -> &str {
        "store_memory"
    }

    fn description(&self) -> &str {
        "Record an experience memory so it can be retrieved by later searches"
    }

    fn args_schema(&self) -> Value {
        args_schema::<StoreMemoryArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: StoreMemoryArgs = parse_args(args)?;
        let record = ctx.memory_store()?.lock().create(MemoryDraft {
            title: input.title,
            content: input.content,
            category: input.category,
            tags: input.tags,
            project: input.project,
            context: input.context,
        })?;
        to_value(&record)
    }
}

#[derive(Debug, Default)]
pub struct SearchMemoriesTool;

#[async_trait]
impl Tool for SearchMemoriesTool {
    fn name(&self) -> &str {
        "search_memories"
    }

    fn description(&self) -> &str {
        "Search memories by relevance to a query, best matches first"
    }

    fn args_schema(&self) -> Value {
        args_schema::<SearchMemoriesArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: SearchMemoriesArgs = parse_args(args)?;
        let filter = record_filter(input.category, input.tags, input.project);
        let limit = input.limit.unwrap_or(ctx.services.memory_limit);
        let results = ctx
            .memory_store()?
            .lock()
            .search(&input.query, &filter, limit)?;
        Ok(json!({
            "query": input.query,
            "count": results.len(),
            "results": to_value(&results)?,
        }))
    }
}

#[derive(Debug, Default)]
pub struct GetMemoryTool;

#[async_trait]
impl Tool for GetMemoryTool {
    fn name(&self) -> &str {
        "get_memory"
    }

    fn description(&self) -> &str {
        "Fetch a memory by id"
    }

    fn args_schema(&self) -> Value {
        args_schema::<MemoryIdArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: MemoryIdArgs = parse_args(args)?;
        let store = ctx.memory_store()?.lock();
        to_value(store.get(&input.id)?)
    }
}

#[derive(Debug, Default)]
pub struct ListMemoriesTool;

#[async_trait]
impl Tool for ListMemoriesTool {
    fn name(&self) -> &str {
        "list_memories"
    }

    fn description(&self) -> &str {
        "List the memories in a category in the order they were stored"
    }

    fn args_schema(&self) -> Value {
        args_schema::<ListMemoriesArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: ListMemoriesArgs = parse_args(args)?;
        let store = ctx.memory_store()?.lock();
        let memories = store.list_by_category(&input.category);
        Ok(json!({
            "category": input.category,
            "count": memories.len(),
            "memories": to_value(&memories)?,
        }))
    }
}

#[derive(Debug, Default)]
pub struct ExportMemoriesTool;

#[async_trait]
impl Tool for ExportMemoriesTool {
    fn name(&self) -> &str {
        "export_memories"
    }

    fn description(&self) -> &str {
        "Export memories, optionally filtered, as a JSON document that import_memories accepts"
    }

    fn args_schema(&self) -> Value {
        args_schema::<ExportMemoriesArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: ExportMemoriesArgs = parse_args(args)?;
        let filter = record_filter(input.category, input.tags, input.project);
        let store = ctx.memory_store()?.lock();
        to_value(&store.export(&filter))
    }
}

#[derive(Debug, Default)]
pub struct ImportMemoriesTool;

#[async_trait]
impl Tool for ImportMemoriesTool {
    fn name(&self) -> &str {
        "import_memories"
    }

    fn description(&self) -> &str {
        "Import memories from an export document; memories whose id already exists are skipped"
    }

    fn args_schema(&self) -> Value {
        args_schema::<ImportMemoriesArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: ImportMemoriesArgs = parse_args(args)?;
        let text = data_text(input.data)?;
        let summary = ctx.memory_store()?.lock().import(&text)?;
        to_value(&summary)
    }
}
