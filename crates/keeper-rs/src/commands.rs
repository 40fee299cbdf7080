//! One-shot store commands run outside the MCP server.

use crate::cli::{ExportArgs, FilterArgs, MemoryCommand, RulesCommand};
use anyhow::Context;
use keeper_rs_config::KeeperConfig;
use keeper_rs_store::{
    FsStorage, MemoryStore, RecordFilter, RuleStore, RuleStoreOptions, SystemClock,
};
use log::info;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

fn open_memory(config: &KeeperConfig) -> anyhow::Result<MemoryStore> {
    let path = config.memory_path().context("failed to resolve memory store path")?;
    Ok(MemoryStore::open(path, Arc::new(FsStorage), Arc::new(SystemClock)))
}

fn open_rules(config: &KeeperConfig) -> anyhow::Result<RuleStore> {
    let path = config.rules_path().context("failed to resolve rule store path")?;
    Ok(RuleStore::open(
        path,
        Arc::new(FsStorage),
        Arc::new(SystemClock),
        RuleStoreOptions {
            id_strategy: config.rules.id_strategy,
            seed_defaults: config.rules.seed_defaults,
        },
    ))
}

fn filter_from(filter: FilterArgs, project: Option<String>) -> RecordFilter {
    RecordFilter {
        category: filter.category,
        tags: filter.tags,
        project,
    }
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_export(out: &mut impl Write, output: Option<&Path>, json: String) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("export written (path={})", path.display());
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}

fn read_import(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn run_memory(
    command: MemoryCommand,
    config: &KeeperConfig,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        MemoryCommand::Search {
            query,
            filter,
            project,
            limit,
        } => {
            let store = open_memory(config)?;
            let limit = limit.unwrap_or(config.memory.default_limit);
            let results = store.search(&query, &filter_from(filter, project), limit)?;
            print_json(out, &results)
        }
        MemoryCommand::Export(ExportArgs { category, output }) => {
            let store = open_memory(config)?;
            let filter = RecordFilter {
                category,
                ..RecordFilter::default()
            };
            write_export(out, output.as_deref(), store.export_json(&filter)?)
        }
        MemoryCommand::Import { file } => {
            let text = read_import(&file)?;
            let summary = open_memory(config)?
                .import(&text)
                .with_context(|| format!("failed to import {}", file.display()))?;
            print_json(out, &summary)
        }
    }
}

pub fn run_rules(
    command: RulesCommand,
    config: &KeeperConfig,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        RulesCommand::Search {
            query,
            filter,
            limit,
        } => {
            let store = open_rules(config)?;
            let limit = limit.unwrap_or(config.rules.default_limit);
            let results = store.search(&query, &filter_from(filter, None), limit)?;
            print_json(out, &results)
        }
        RulesCommand::List { category } => {
            let store = open_rules(config)?;
            print_json(out, &store.list_by_category(&category)?)
        }
        RulesCommand::Categories => print_json(out, &open_rules(config)?.list_categories()),
        RulesCommand::Export(ExportArgs { category, output }) => {
            let store = open_rules(config)?;
            let filter = RecordFilter {
                category,
                ..RecordFilter::default()
            };
            write_export(out, output.as_deref(), store.export_json(&filter)?)
        }
        RulesCommand::Import { file } => {
            let text = read_import(&file)?;
            let summary = open_rules(config)?
                .import(&text)
                .with_context(|| format!("failed to import {}", file.display()))?;
            print_json(out, &summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{run_memory, run_rules};
    use crate::cli::{ExportArgs, FilterArgs, MemoryCommand, RulesCommand};
    use keeper_rs_config::{KeeperConfig, RulesConfig};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::tempdir;

    fn config(data_dir: &std::path::Path, seed_defaults: bool) -> KeeperConfig {
        KeeperConfig::builder()
            .data_dir(data_dir.to_string_lossy())
            .rules(RulesConfig {
                seed_defaults,
                ..RulesConfig::default()
            })
            .build()
    }

    fn run_rules_json(command: RulesCommand, config: &KeeperConfig) -> Value {
        let mut out = Vec::new();
        run_rules(command, config, &mut out).expect("rules command");
        serde_json::from_slice(&out).expect("json output")
    }

    #[test]
    fn first_rules_command_seeds_defaults() {
        let temp = tempdir().expect("tempdir");
        let config = config(temp.path(), true);
        let categories = run_rules_json(RulesCommand::Categories, &config);
        assert!(!categories.as_array().expect("array").is_empty());
    }

    #[test]
    fn rules_import_then_list() {
        let temp = tempdir().expect("tempdir");
        let config = config(&temp.path().join("data"), false);
        let file = temp.path().join("rules.json");
        fs::write(
            &file,
            json!([{ "title": "pin toolchains", "content": "use rust-toolchain.toml", "category": "build" }])
                .to_string(),
        )
        .expect("write import");

        let summary = run_rules_json(RulesCommand::Import { file }, &config);
        assert_eq!(summary, json!({ "imported": 1, "skipped": 0 }));

        let listed = run_rules_json(
            RulesCommand::List {
                category: "build".to_string(),
            },
            &config,
        );
        assert_eq!(listed[0]["id"], "bui-001");

        let results = run_rules_json(
            RulesCommand::Search {
                query: "toolchain".to_string(),
                filter: FilterArgs::default(),
                limit: None,
            },
            &config,
        );
        assert_eq!(results[0]["score"], 65);
    }

    #[test]
    fn listing_an_unknown_category_fails() {
        let temp = tempdir().expect("tempdir");
        let config = config(temp.path(), false);
        let mut out = Vec::new();
        let err = run_rules(
            RulesCommand::List {
                category: "nope".to_string(),
            },
            &config,
            &mut out,
        )
        .expect_err("unknown category");
        assert_eq!(err.to_string(), "category not found: nope");
    }

    #[test]
    fn memory_export_writes_file() {
        let temp = tempdir().expect("tempdir");
        let config = config(&temp.path().join("data"), false);
        let input = temp.path().join("in.json");
        fs::write(
            &input,
            json!([
                { "title": "flaky test", "content": "retry with --nocapture", "category": "debugging" },
                { "title": "deploy", "content": "tag first", "category": "ops" }
            ])
            .to_string(),
        )
        .expect("write import");
        let mut out = Vec::new();
        run_memory(MemoryCommand::Import { file: input }, &config, &mut out).expect("import");

        let output = temp.path().join("out.json");
        let mut out = Vec::new();
        run_memory(
            MemoryCommand::Export(ExportArgs {
                category: Some("debugging".to_string()),
                output: Some(output.clone()),
            }),
            &config,
            &mut out,
        )
        .expect("export");
        assert!(out.is_empty());

        let document: Value =
            serde_json::from_str(&fs::read_to_string(output).expect("read export")).expect("json");
        assert_eq!(document["kind"], "memory");
        assert_eq!(document["count"], 1);
        assert_eq!(document["records"][0]["title"], "flaky test");
    }

    #[test]
    fn import_of_missing_file_names_the_path() {
        let temp = tempdir().expect("tempdir");
        let config = config(temp.path(), false);
        let mut out = Vec::new();
        let err = run_memory(
            MemoryCommand::Import {
                file: temp.path().join("absent.json"),
            },
            &config,
            &mut out,
        )
        .expect_err("missing file");
        assert!(err.to_string().starts_with("failed to read "));
    }
}
