//! Tools over the rule store and its category index.

use crate::builtins::utils::{args_schema, data_text, parse_args, record_filter, to_value};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use keeper_rs_protocol::ToolError;
use keeper_rs_store::{RuleDraft, RulePatch};
use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateRuleArgs {
    title: String,
    /// The rule itself.
    content: String,
    /// Category; created on first use. Rule ids are derived from it.
    category: String,
    /// One-line explanation of when the rule applies.
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    /// Short snippets illustrating the rule.
    #[serde(default)]
    examples: Vec<String>,
    /// Ids of related rules.
    #[serde(default)]
    related_rules: Vec<String>,
    /// Semantic version; defaults to 1.0.0.
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchRulesArgs {
    /// Text to look for. Also applied as a case-insensitive regular expression to the content.
    query: String,
    /// Only rules whose category contains this text.
    #[serde(default)]
    category: Option<String>,
    /// Only rules sharing at least one of these tags.
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct RuleIdArgs {
    /// Rule id, e.g. "git-001".
    id: String,
}

/// Every field except `id` is optional; omitted fields keep their value.
#[derive(Debug, Deserialize, JsonSchema)]
struct UpdateRuleArgs {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    /// Moving a rule to another category keeps its id.
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    examples: Option<Vec<String>>,
    #[serde(default)]
    related_rules: Option<Vec<String>>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListRulesArgs {
    /// Exact category name.
    category: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct NoArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
struct ExportRulesArgs {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ImportRulesArgs {
    /// Export document or array of rules, either as JSON or as a JSON string.
    data: Value,
}

#[derive(Debug, Default)]
pub struct CreateRuleTool;

#[async_trait]
impl Tool for CreateRuleTool {
    fn name(&self) -> &str {
        "create_rule"
    }

    fn description(&self) -> &str {
        "Create a rule in a category; the id is derived from the category name"
    }

    fn args_schema(&self) -> Value {
        args_schema::<CreateRuleArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: CreateRuleArgs = parse_args(args)?;
        let record = ctx.rule_store()?.lock().create(RuleDraft {
            title: input.title,
            description: input.description,
            content: input.content,
            category: input.category,
            tags: input.tags,
            examples: input.examples,
            related_rules: input.related_rules,
            version: input.version,
        })?;
        to_value(&record)
    }
}

#[derive(Debug, Default)]
pub struct SearchRulesTool;

#[async_trait]
impl Tool for SearchRulesTool {
    fn name(&self) -> &str {
        "search_rules"
    }

    fn description(&self) -> &str {
        "Search rules by relevance to a query, best matches first"
    }

    fn args_schema(&self) -> Value {
        args_schema::<SearchRulesArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: SearchRulesArgs = parse_args(args)?;
        let filter = record_filter(input.category, input.tags, None);
        let limit = input.limit.unwrap_or(ctx.services.rule_limit);
        let results = ctx
            .rule_store()?
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
pub struct GetRuleTool;

#[async_trait]
impl Tool for GetRuleTool {
    fn name(&self) -> &str {
        "get_rule"
    }

    fn description(&self) -> &str {
        "Fetch a rule by id"
    }

    fn args_schema(&self) -> Value {
        args_schema::<RuleIdArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: RuleIdArgs = parse_args(args)?;
        let store = ctx.rule_store()?.lock();
        to_value(store.get(&input.id)?)
    }
}

#[derive(Debug, Default)]
pub struct UpdateRuleTool;

#[async_trait]
impl Tool for UpdateRuleTool {
    fn name(&self) -> &str {
        "update_rule"
    }

    fn description(&self) -> &str {
        "Update fields of an existing rule; omitted fields are left unchanged"
    }

    fn args_schema(&self) -> Value {
        args_schema::<UpdateRuleArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: UpdateRuleArgs = parse_args(args)?;
        let patch = RulePatch {
            title: input.title,
            description: input.description,
            content: input.content,
            category: input.category,
            tags: input.tags,
            examples: input.examples,
            related_rules: input.related_rules,
            version: input.version,
        };
        if patch.is_empty() {
            return Err(ToolError::InvalidArguments(
                "no fields to update".to_string(),
            ));
        }
        let record = ctx.rule_store()?.lock().update(&input.id, patch)?;
        to_value(&record)
    }
}

#[derive(Debug, Default)]
pub struct DeleteRuleTool;

#[async_trait]
impl Tool for DeleteRuleTool {
    fn name(&self) -> &str {
        "delete_rule"
    }

    fn description(&self) -> &str {
        "Delete a rule by id"
    }

    fn args_schema(&self) -> Value {
        args_schema::<RuleIdArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: RuleIdArgs = parse_args(args)?;
        let removed = ctx.rule_store()?.lock().delete(&input.id)?;
        Ok(json!({ "deleted": removed.id, "category": removed.category }))
    }
}

#[derive(Debug, Default)]
pub struct ListRulesTool;

#[async_trait]
impl Tool for ListRulesTool {
    fn name(&self) -> &str {
        "list_rules"
    }

    fn description(&self) -> &str {
        "List the rules in a category in creation order"
    }

    fn args_schema(&self) -> Value {
        args_schema::<ListRulesArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: ListRulesArgs = parse_args(args)?;
        let store = ctx.rule_store()?.lock();
        let rules = store.list_by_category(&input.category)?;
        Ok(json!({
            "category": input.category,
            "count": rules.len(),
            "rules": to_value(&rules)?,
        }))
    }
}

#[derive(Debug, Default)]
pub struct ListRuleCategoriesTool;

#[async_trait]
impl Tool for ListRuleCategoriesTool {
    fn name(&self) -> &str {
        "list_rule_categories"
    }

    fn description(&self) -> &str {
        "List rule categories with their descriptions and rule counts"
    }

    fn args_schema(&self) -> Value {
        args_schema::<NoArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, _args: Value) -> Result<Value, ToolError> {
        let categories = ctx.rule_store()?.lock().list_categories();
        Ok(json!({ "categories": to_value(&categories)? }))
    }
}

#[derive(Debug, Default)]
pub struct ExportRulesTool;

#[async_trait]
impl Tool for ExportRulesTool {
    fn name(&self) -> &str {
        "export_rules"
    }

    fn description(&self) -> &str {
        "Export rules, optionally filtered, as a JSON document that import_rules accepts"
    }

    fn args_schema(&self) -> Value {
        args_schema::<ExportRulesArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: ExportRulesArgs = parse_args(args)?;
        let filter = record_filter(input.category, input.tags, None);
        let store = ctx.rule_store()?.lock();
        to_value(&store.export(&filter))
    }
}

#[derive(Debug, Default)]
pub struct ImportRulesTool;

#[async_trait]
impl Tool for ImportRulesTool {
    fn name(&self) -> &str {
        "import_rules"
    }

    fn description(&self) -> &str {
        "Import rules from an export document; rules whose id already exists are skipped"
    }

    fn args_schema(&self) -> Value {
        args_schema::<ImportRulesArgs>()
    }

    fn applies_output_policy(&self) -> bool {
        false
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: ImportRulesArgs = parse_args(args)?;
        let text = data_text(input.data)?;
        let summary = ctx.rule_store()?.lock().import(&text)?;
        to_value(&summary)
    }
}
