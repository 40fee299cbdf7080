//! `keeper`: MCP server and command-line access to the memory and rule stores.

mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use keeper_rs_config::{KeeperConfig, LayeredConfigOptions};
use keeper_rs_server::{KeeperMcpServer, build_services, run_stdio_server};
use keeper_rs_tools::{builtin_resource_registry, builtin_tool_registry};
use log::{LevelFilter, debug, info};
use std::io;
use std::path::{Path, PathBuf};

/// Entry point for the keeper binary.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // stdout carries the MCP channel; logs go to stderr.
    let _ = env_logger::builder()
        .filter_level(if cli.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        })
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .parse_default_env()
        .try_init();

    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let config = load_config(&cwd, cli.config.as_deref(), cli.data_dir.as_deref())?;

    match cli.command {
        Command::Serve { workspace } => serve(config, &cwd, workspace).await,
        Command::Memory(command) => commands::run_memory(command, &config, &mut io::stdout()),
        Command::Rules(command) => commands::run_rules(command, &config, &mut io::stdout()),
    }
}

fn load_config(
    cwd: &Path,
    runtime: Option<&Path>,
    data_dir: Option<&Path>,
) -> anyhow::Result<KeeperConfig> {
    let mut options = LayeredConfigOptions::new(cwd);
    if let Some(path) = runtime {
        options = options.with_runtime_path(path);
    }
    let layered = KeeperConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());

    let mut config = layered.config;
    if let Some(dir) = data_dir {
        config.storage.data_dir = Some(dir.to_string_lossy().into_owned());
    }
    Ok(config)
}

async fn serve(
    mut config: KeeperConfig,
    cwd: &Path,
    workspace: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(workspace) = workspace {
        config.tools.workspace_root = Some(workspace.to_string_lossy().into_owned());
    }
    let services = build_services(&config, cwd).context("failed to open stores")?;
    let server = KeeperMcpServer::new(
        builtin_tool_registry(config.tools.shell_enabled),
        builtin_resource_registry(),
        services,
    );
    info!(
        "serving (shell_enabled={}, data_dir={:?})",
        config.tools.shell_enabled, config.storage.data_dir
    );
    run_stdio_server(server).await.context("MCP server failed")?;
    Ok(())
}
