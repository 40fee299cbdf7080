//! Built-in tool for running programs in the workspace.

use crate::builtins::utils::args_schema;
use crate::builtins::workspace::{self, Target};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use keeper_rs_protocol::ToolError;
use log::{info, warn};
use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Timeout applied when the caller does not provide one.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct RunCommandArgs {
    /// Command line to execute. It is split with shell quoting rules and run without a shell.
    command: String,
    /// Working directory relative to the workspace root. Defaults to the server's working directory.
    #[serde(default)]
    cwd: Option<String>,
    /// Seconds to wait before the command is killed.
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// Runs a single program and captures its output.
#[derive(Debug, Default)]
pub struct RunCommandTool;

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Run a program in the workspace and return its exit status, stdout and stderr"
    }

    fn args_schema(&self) -> Value {
        args_schema::<RunCommandArgs>()
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input = parse_run_command_args(args)?;
        let (program, program_args) = parse_command_line(&input.command)?;
        info!(
            "executing command (args_len={}, has_cwd={})",
            program_args.len(),
            input.cwd.is_some(),
        );

        let cwd = match input.cwd.as_deref() {
            Some(cwd) => workspace::resolve(ctx, cwd, Target::MustExist)?,
            None => ctx.services.cwd.clone(),
        };

        let raw_program = PathBuf::from(&program);
        let program = if raw_program.components().count() > 1 || raw_program.is_absolute() {
            workspace::resolve(ctx, &program, Target::MustExist)?
        } else {
            raw_program
        };

        let mut command = Command::new(&program);
        command
            .args(&program_args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let timeout = Duration::from_secs(input.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let output = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| {
                ToolError::ExecutionFailed(format!(
                    "command timed out after {}s",
                    timeout.as_secs()
                ))
            })?
            .map_err(|err| ToolError::ExecutionFailed(format!("failed to spawn command: {err}")))?;

        let status_code = output.status.code();
        if status_code != Some(0) {
            warn!("command finished with non-zero status (status={status_code:?})");
        }
        Ok(json!({
            "status_code": status_code,
            "stdout": String::from_utf8_lossy(&output.stdout),
            "stderr": String::from_utf8_lossy(&output.stderr),
        }))
    }
}

fn parse_run_command_args(args: Value) -> Result<RunCommandArgs, ToolError> {
    serde_json::from_value(args).map_err(|err| {
        let message = err.to_string();
        if message.contains("unknown field `args`") {
            return ToolError::InvalidArguments(
                "args is not supported; pass a single command string".to_string(),
            );
        }
        ToolError::InvalidArguments(message)
    })
}

fn parse_command_line(command: &str) -> Result<(String, Vec<String>), ToolError> {
    if command.trim().is_empty() {
        return Err(ToolError::InvalidArguments(
            "command cannot be empty".to_string(),
        ));
    }
    let tokens =
        shell_words::split(command).map_err(|err| ToolError::InvalidArguments(err.to_string()))?;
    let mut iter = tokens.into_iter();
    let Some(program) = iter.next() else {
        return Err(ToolError::InvalidArguments(
            "command cannot be empty".to_string(),
        ));
    };
    Ok((program, iter.collect()))
}
