use async_trait::async_trait;
use keeper_rs_protocol::ToolError;
use keeper_rs_tools::{Tool, ToolContext};
use serde_json::{Value, json};

/// Tool returning a fixed result, or a fixed error when configured.
#[derive(Debug, Clone)]
pub struct DummyTool {
    name: String,
    description: String,
    args_schema: Value,
    result: Value,
    error: Option<String>,
}

impl DummyTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "dummy".to_string(),
            args_schema: json!({ "type": "object" }),
            result: json!({}),
            error: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = result;
        self
    }

    /// Fail every call with `ToolError::ExecutionFailed(message)`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

#[async_trait]
impl Tool for DummyTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn args_schema(&self) -> Value {
        self.args_schema.clone()
    }

    async fn call(&self, _ctx: &ToolContext, _args: Value) -> Result<Value, ToolError> {
        match &self.error {
            Some(message) => Err(ToolError::ExecutionFailed(message.clone())),
            None => Ok(self.result.clone()),
        }
    }
}
