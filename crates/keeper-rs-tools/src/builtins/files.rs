//! `read_file` and `write_file`, confined to the workspace root.

use crate::builtins::utils::{args_schema, parse_args};
use crate::builtins::workspace::{self, Target};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use keeper_rs_protocol::ToolError;
use log::info;
use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;

/// Read cap when neither the call nor the output policy sets one.
const FALLBACK_READ_LIMIT: usize = 200_000;

#[derive(Debug, Deserialize, JsonSchema)]
struct ReadFileArgs {
    /// File path relative to the workspace root.
    path: String,
    /// Maximum bytes to return; longer files are truncated.
    #[serde(default)]
    max_bytes: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct WriteFileArgs {
    /// File path relative to the workspace root. Missing parent directories are created.
    path: String,
    /// Text to write.
    content: String,
    /// Replace the file if it already exists.
    #[serde(default)]
    overwrite: bool,
}

fn io_failure(action: &str, path: &Path, err: std::io::Error) -> ToolError {
    ToolError::ExecutionFailed(format!("failed to {action} {}: {err}", path.display()))
}

#[derive(Debug, Default)]
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a text file from the workspace"
    }

    fn args_schema(&self) -> Value {
        args_schema::<ReadFileArgs>()
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: ReadFileArgs = parse_args(args)?;
        let path = workspace::resolve(ctx, &input.path, Target::MustExist)?;
        if fs::metadata(&path)
            .await
            .map_err(|err| io_failure("inspect", &path, err))?
            .is_dir()
        {
            return Err(ToolError::ExecutionFailed("path is a directory".to_string()));
        }

        let limit = input
            .max_bytes
            .or_else(|| {
                ctx.services
                    .output_policy
                    .as_ref()
                    .map(|policy| policy.max_string_bytes)
            })
            .unwrap_or(FALLBACK_READ_LIMIT);

        // One byte past the limit tells us whether the file was cut.
        let file = fs::File::open(&path)
            .await
            .map_err(|err| io_failure("open", &path, err))?;
        let mut buffer = Vec::new();
        file.take(limit as u64 + 1)
            .read_to_end(&mut buffer)
            .await
            .map_err(|err| io_failure("read", &path, err))?;
        let truncated = buffer.len() > limit;
        buffer.truncate(limit);

        info!(
            "file read (bytes_read={}, truncated={truncated})",
            buffer.len()
        );
        Ok(json!({
            "path": workspace::display(&ctx.services.workspace_root, &path),
            "bytes_read": buffer.len(),
            "truncated": truncated,
            "content": String::from_utf8_lossy(&buffer),
        }))
    }
}

#[derive(Debug, Default)]
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Create or overwrite a file in the workspace"
    }

    fn args_schema(&self) -> Value {
        args_schema::<WriteFileArgs>()
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: WriteFileArgs = parse_args(args)?;
        let path = workspace::resolve(ctx, &input.path, Target::MayBeCreated)?;

        let overwritten = match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => {
                return Err(ToolError::ExecutionFailed("path is a directory".to_string()));
            }
            Ok(_) if !input.overwrite => {
                return Err(ToolError::ExecutionFailed(
                    "file exists; set overwrite to true to replace".to_string(),
                ));
            }
            Ok(_) => true,
            Err(_) => false,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| io_failure("create", parent, err))?;
        }
        fs::write(&path, &input.content)
            .await
            .map_err(|err| io_failure("write", &path, err))?;

        info!(
            "file written (bytes_written={}, overwritten={overwritten})",
            input.content.len()
        );
        Ok(json!({
            "path": workspace::display(&ctx.services.workspace_root, &path),
            "bytes_written": input.content.len(),
            "overwritten": overwritten,
        }))
    }
}
