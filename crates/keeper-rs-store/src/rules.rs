//! Rule entries: a mutable record store with a category index.

use crate::category::CategorySummary;
use crate::clock::Clock;
use crate::error::StoreError;
use crate::filter::RecordFilter;
use crate::ids::allocate_rule_id;
use crate::rank::ScoredRecord;
use crate::record::{Record, ScoreFields, ScoringWeights, normalize_tags, require_field};
use crate::storage::SnapshotStorage;
use crate::store::{ExportDocument, ImportSummary, RecordStore};
use chrono::{DateTime, Utc};
use keeper_rs_protocol::{IdStrategy, StoreKind};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

/// Version assigned to rules created without one.
pub const DEFAULT_RULE_VERSION: &str = "1.0.0";

fn default_version() -> String {
    DEFAULT_RULE_VERSION.to_string()
}

/// A coding rule or convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    /// Ids of related rules; not checked for existence.
    #[serde(default)]
    pub related_rules: Vec<String>,
    #[serde(default = "default_version")]
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl Record for RuleRecord {
    const KIND: StoreKind = StoreKind::Rules;
    const WEIGHTS: ScoringWeights = ScoringWeights::RULE;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn score_fields(&self) -> ScoreFields<'_> {
        ScoreFields {
            title: &self.title,
            category: &self.category,
            tags: &self.tags,
            content: &self.content,
            supplementary: Cow::Borrowed(&self.description),
            examples: &self.examples,
        }
    }
}

/// Fields supplied when creating a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDraft {
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
    pub related_rules: Vec<String>,
    pub version: Option<String>,
}

/// Fields to overwrite on an existing rule; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub examples: Option<Vec<String>>,
    pub related_rules: Option<Vec<String>>,
    pub version: Option<String>,
}

impl RulePatch {
    pub fn is_empty(&self) -> bool {
        self == &RulePatch::default()
    }
}

/// Behavior switches for the rule store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleStoreOptions {
    pub id_strategy: IdStrategy,
    /// Seed default categories and rules when the rules directory is absent.
    pub seed_defaults: bool,
}

impl Default for RuleStoreOptions {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::Monotonic,
            seed_defaults: true,
        }
    }
}

/// Rule store.
#[derive(Debug)]
pub struct RuleStore {
    inner: RecordStore<RuleRecord>,
    options: RuleStoreOptions,
}

impl RuleStore {
    /// Open the store at `path`.
    ///
    /// On first run, detected by the absence of the containing directory, the
    /// default categories and rules are seeded when enabled.
    pub fn open(
        path: impl Into<PathBuf>,
        storage: Arc<dyn SnapshotStorage>,
        clock: Arc<dyn Clock>,
        options: RuleStoreOptions,
    ) -> Self {
        let path = path.into();
        let first_run = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .is_some_and(|parent| !storage.dir_exists(parent));
        let mut inner = RecordStore::<RuleRecord>::load(path, storage, clock);
        let ids: Vec<String> = inner.records().iter().map(|r| r.id.clone()).collect();
        for id in &ids {
            inner.counters_mut().observe(id);
        }
        let mut store = Self { inner, options };
        if first_run && options.seed_defaults {
            store.seed_defaults();
        }
        store
    }

    pub fn options(&self) -> RuleStoreOptions {
        self.options
    }

    fn seed_defaults(&mut self) {
        for (name, description) in DEFAULT_CATEGORIES {
            self.inner
                .categories_mut()
                .ensure(name, || description.to_string());
        }
        for draft in default_rules() {
            if let Err(err) = self.insert(draft) {
                warn!("default rule skipped (error={err})");
            }
        }
        match self.inner.save() {
            Ok(()) => info!(
                "default rules seeded (path={}, rules={})",
                self.inner.path().display(),
                self.inner.len()
            ),
            Err(err) => warn!(
                "failed to persist default rules (path={}, error={})",
                self.inner.path().display(),
                err
            ),
        }
    }

    /// Validate, allocate and register a rule without saving.
    fn insert(&mut self, draft: RuleDraft) -> Result<RuleRecord, StoreError> {
        require_field("title", &draft.title)?;
        require_field("content", &draft.content)?;
        require_field("category", &draft.category)?;

        let category = draft.category.trim().to_string();
        let id = self.allocate_id(&category)?;
        let record = RuleRecord {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            content: draft.content,
            category,
            tags: normalize_tags(draft.tags),
            examples: draft.examples,
            related_rules: normalize_tags(draft.related_rules),
            version: draft
                .version
                .map(|version| version.trim().to_string())
                .filter(|version| !version.is_empty())
                .unwrap_or_else(default_version),
            timestamp: self.inner.now(),
        };
        self.inner.append(record.clone())?;
        self.inner
            .categories_mut()
            .add_member(&record.category, &record.id);
        self.inner.counters_mut().observe(&record.id);
        Ok(record)
    }

    fn allocate_id(&mut self, category: &str) -> Result<String, StoreError> {
        let strategy = self.options.id_strategy;
        let (records, counters) = self.inner.allocation_parts();
        let live = records
            .iter()
            .filter(|record| record.category == category)
            .count();
        allocate_rule_id(strategy, category, live, counters, |id| {
            records.iter().any(|record| record.id == id)
        })
    }

    /// Create and persist a rule.
    pub fn create(&mut self, draft: RuleDraft) -> Result<RuleRecord, StoreError> {
        let record = self.insert(draft)?;
        self.inner.save()?;
        info!(
            "rule created (id={}, category={})",
            record.id, record.category
        );
        Ok(record)
    }

    /// Shallow-merge `patch` into the rule and refresh its timestamp.
    pub fn update(&mut self, id: &str, patch: RulePatch) -> Result<RuleRecord, StoreError> {
        if let Some(title) = &patch.title {
            require_field("title", title)?;
        }
        if let Some(content) = &patch.content {
            require_field("content", content)?;
        }
        if let Some(category) = &patch.category {
            require_field("category", category)?;
        }

        let now = self.inner.now();
        let record = self.inner.get_mut(id)?;
        let previous_category = record.category.clone();
        if let Some(title) = patch.title {
            record.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            record.description = description.trim().to_string();
        }
        if let Some(content) = patch.content {
            record.content = content;
        }
        if let Some(category) = patch.category {
            record.category = category.trim().to_string();
        }
        if let Some(tags) = patch.tags {
            record.tags = normalize_tags(tags);
        }
        if let Some(examples) = patch.examples {
            record.examples = examples;
        }
        if let Some(related) = patch.related_rules {
            record.related_rules = normalize_tags(related);
        }
        if let Some(version) = patch.version.filter(|version| !version.trim().is_empty()) {
            record.version = version.trim().to_string();
        }
        record.timestamp = now;
        let updated = record.clone();

        if updated.category != previous_category {
            let categories = self.inner.categories_mut();
            categories.remove_member(&previous_category, &updated.id);
            categories.add_member(&updated.category, &updated.id);
        }
        self.inner.save()?;
        info!("rule updated (id={})", updated.id);
        Ok(updated)
    }

    /// Delete a rule and drop it from its category.
    pub fn delete(&mut self, id: &str) -> Result<RuleRecord, StoreError> {
        let removed = self.inner.remove(id)?;
        self.inner
            .categories_mut()
            .remove_member(&removed.category, &removed.id);
        self.inner.save()?;
        info!(
            "rule deleted (id={}, category={})",
            removed.id, removed.category
        );
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Result<&RuleRecord, StoreError> {
        self.inner.get(id)
    }

    pub fn search(
        &self,
        query: &str,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<Vec<ScoredRecord<RuleRecord>>, StoreError> {
        self.inner.search(query, filter, limit)
    }

    /// Rules in a known category, in creation order.
    pub fn list_by_category(&self, category: &str) -> Result<Vec<&RuleRecord>, StoreError> {
        if !self.inner.categories().contains(category) {
            return Err(StoreError::CategoryNotFound(category.to_string()));
        }
        Ok(self.inner.list_by_category(category))
    }

    /// Every category with its description and member count.
    pub fn list_categories(&self) -> Vec<CategorySummary> {
        self.inner
            .categories()
            .iter()
            .map(CategorySummary::from)
            .collect()
    }

    pub fn records(&self) -> &[RuleRecord] {
        self.inner.records()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn export(&self, filter: &RecordFilter) -> ExportDocument<RuleRecord> {
        self.inner.export(filter)
    }

    /// Serialize an export of the rules passing `filter`.
    pub fn export_json(&self, filter: &RecordFilter) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.export(filter))?)
    }

    /// Serialize the category index.
    pub fn categories_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.list_categories())?)
    }

    /// Import rules from an export document or bare array.
    ///
    /// Entries whose id is already stored are skipped. Imported rules join
    /// their category and advance the id counters. The store is left as it
    /// was if any entry is invalid or an id cannot be allocated.
    pub fn import(&mut self, text: &str) -> Result<ImportSummary, StoreError> {
        let decoded = self.inner.decode_import(text)?;
        let checkpoint = self.inner.checkpoint();
        match self.apply_import(decoded) {
            Ok(summary) => {
                info!(
                    "rules imported (imported={}, skipped={})",
                    summary.imported, summary.skipped
                );
                Ok(summary)
            }
            Err(err) => {
                self.inner.restore(checkpoint);
                warn!("rule import rolled back (error={err})");
                Err(err)
            }
        }
    }

    fn apply_import(&mut self, decoded: Vec<RuleRecord>) -> Result<ImportSummary, StoreError> {
        let mut summary = ImportSummary::default();
        for mut record in decoded {
            if record.id.trim().is_empty() {
                let id = self.allocate_id(&record.category)?;
                record.set_id(id);
            }
            if self.inner.contains(&record.id) {
                summary.skipped += 1;
                continue;
            }
            let (id, category) = (record.id.clone(), record.category.clone());
            self.inner.append(record)?;
            self.inner.categories_mut().add_member(&category, &id);
            self.inner.counters_mut().observe(&id);
            summary.imported += 1;
        }
        if summary.imported > 0 {
            self.inner.save()?;
        }
        Ok(summary)
    }
}

const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("coding", "General coding standards and conventions"),
    ("git", "Version control workflow and commit hygiene"),
    ("testing", "Test design and coverage expectations"),
    ("security", "Secure coding practices"),
    ("documentation", "Documentation and comment guidelines"),
];

fn default_rules() -> Vec<RuleDraft> {
    fn draft(
        category: &str,
        title: &str,
        description: &str,
        content: &str,
        tags: &[&str],
        examples: &[&str],
    ) -> RuleDraft {
        RuleDraft {
            title: title.to_string(),
            description: description.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            examples: examples.iter().map(|example| example.to_string()).collect(),
            related_rules: Vec::new(),
            version: None,
        }
    }

    vec![
        draft(
            "coding",
            "Descriptive names",
            "Prefer names that state intent over abbreviations",
            "Name variables and functions after what they represent or do. Avoid single-letter names outside short closures and loop indices.",
            &["naming", "readability"],
            &["let retry_delay = base * 2;", "fn parse_header(line: &str)"],
        ),
        draft(
            "git",
            "Conventional commit messages",
            "Commit subjects follow the type(scope): summary form",
            "Start each commit subject with a type such as feat, fix, docs or refactor, keep it under 72 characters and write it in the imperative mood.",
            &["commits", "workflow"],
            &["fix(store): keep ids unique after delete", "docs: describe import format"],
        ),
        draft(
            "testing",
            "Test behavior not internals",
            "Assert on observable results",
            "Tests exercise public behavior and assert on outputs and side effects. Avoid asserting on private state that can change without a behavior change.",
            &["unit-tests", "design"],
            &["assert_eq!(store.get(id)?.title, \"x\")"],
        ),
        draft(
            "security",
            "Never commit secrets",
            "Keep credentials out of the repository",
            "API keys, tokens and passwords are read from the environment or a secret manager and never checked in. Rotate any secret that reached version control.",
            &["secrets", "credentials"],
            &["let token = std::env::var(\"API_TOKEN\")?;"],
        ),
    ]
}
