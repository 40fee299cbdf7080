//! Argument decoding and result encoding shared by the built-in tools.

use keeper_rs_protocol::ToolError;
use keeper_rs_store::RecordFilter;
use rmcp::schemars::{self, JsonSchema};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub(super) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|err| ToolError::InvalidArguments(err.to_string()))
}

/// Input schema advertised in `tools/list`; a bare object schema if generation fails.
pub(super) fn args_schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| json!({ "type": "object" }))
}

pub(super) fn to_value<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|err| ToolError::ExecutionFailed(err.to_string()))
}

/// Import payloads arrive either as embedded JSON or as a JSON string.
pub(super) fn data_text(data: Value) -> Result<String, ToolError> {
    match data {
        Value::String(text) => Ok(text),
        other => serde_json::to_string(&other)
            .map_err(|err| ToolError::InvalidArguments(err.to_string())),
    }
}

pub(super) fn record_filter(
    category: Option<String>,
    tags: Option<Vec<String>>,
    project: Option<String>,
) -> RecordFilter {
    RecordFilter {
        category,
        tags: tags.unwrap_or_default(),
        project,
    }
}
