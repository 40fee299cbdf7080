//! Command-line surface of the `keeper` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Memory and rule keeper for coding agents.
#[derive(Debug, Parser)]
#[command(name = "keeper", version)]
pub struct Cli {
    /// Extra keeper.json5 applied over the discovered config layers
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding the memory/ and rules/ stores
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Log at info level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the MCP server on stdin/stdout
    Serve {
        /// Root for the file and shell tools (defaults to the current directory)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
    /// Work with experience memories
    #[command(subcommand)]
    Memory(MemoryCommand),
    /// Work with coding rules
    #[command(subcommand)]
    Rules(RulesCommand),
}

#[derive(Debug, Subcommand)]
pub enum MemoryCommand {
    /// Ranked search over memories
    Search {
        query: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Only memories whose project contains this text
        #[arg(long)]
        project: Option<String>,
        /// Maximum number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Write memories as an export document
    Export(ExportArgs),
    /// Load memories from an export document or array
    Import { file: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// Ranked search over rules
    Search {
        query: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Maximum number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Rules in one category
    List { category: String },
    /// Known categories with rule counts
    Categories,
    /// Write rules as an export document
    Export(ExportArgs),
    /// Load rules from an export document or array
    Import { file: PathBuf },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only records whose category contains this text
    #[arg(long)]
    pub category: Option<String>,
    /// Only records sharing one of these tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ExportArgs {
    #[arg(long)]
    pub category: Option<String>,
    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, MemoryCommand, RulesCommand};
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_memory_search_with_filters() {
        let cli = Cli::try_parse_from([
            "keeper", "memory", "search", "auth", "--tag", "jwt", "--tag", "oauth", "--project",
            "api", "-n", "3",
        ])
        .expect("parse");
        let Command::Memory(MemoryCommand::Search {
            query,
            filter,
            project,
            limit,
        }) = cli.command
        else {
            panic!("expected memory search");
        };
        assert_eq!(query, "auth");
        assert_eq!(filter.tags, vec!["jwt".to_string(), "oauth".to_string()]);
        assert_eq!(project.as_deref(), Some("api"));
        assert_eq!(limit, Some(3));
    }

    #[test]
    fn global_options_follow_subcommands() {
        let cli = Cli::try_parse_from(["keeper", "rules", "categories", "--data-dir", "/tmp/k", "-v"])
            .expect("parse");
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/k")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Rules(RulesCommand::Categories)));
    }

    #[test]
    fn rules_list_requires_category() {
        assert!(Cli::try_parse_from(["keeper", "rules", "list"]).is_err());
    }
}
