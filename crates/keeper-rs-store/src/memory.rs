//! Experience memories: an append-only record store.

use crate::clock::Clock;
use crate::error::StoreError;
use crate::filter::RecordFilter;
use crate::ids::memory_id;
use crate::rank::ScoredRecord;
use crate::record::{Record, ScoreFields, ScoringWeights, normalize_tags, require_field};
use crate::storage::SnapshotStorage;
use crate::store::{ExportDocument, ImportSummary, RecordStore};
use chrono::{DateTime, Utc};
use keeper_rs_protocol::StoreKind;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A stored lesson, fix or observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Free-form context such as `file`, `language` or `error`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl MemoryRecord {
    /// Context values joined with single spaces, in key order.
    pub fn context_text(&self) -> String {
        self.context
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Record for MemoryRecord {
    const KIND: StoreKind = StoreKind::Memory;
    const WEIGHTS: ScoringWeights = ScoringWeights::MEMORY;

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

    fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    fn score_fields(&self) -> ScoreFields<'_> {
        ScoreFields {
            title: &self.title,
            category: &self.category,
            tags: &self.tags,
            content: &self.content,
            supplementary: Cow::Owned(self.context_text()),
            examples: &[],
        }
    }
}

/// Fields supplied when storing a memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub project: Option<String>,
    pub context: BTreeMap<String, String>,
}

/// Memory store.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RecordStore<MemoryRecord>,
}

impl MemoryStore {
    /// Open the store at `path`; see [`RecordStore::load`] for failure handling.
    pub fn open(
        path: impl Into<PathBuf>,
        storage: Arc<dyn SnapshotStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: RecordStore::load(path, storage, clock),
        }
    }

    /// Validate, stamp and persist a new memory.
    pub fn create(&mut self, draft: MemoryDraft) -> Result<MemoryRecord, StoreError> {
        require_field("title", &draft.title)?;
        require_field("content", &draft.content)?;
        require_field("category", &draft.category)?;

        let now = self.inner.now();
        let record = MemoryRecord {
            id: memory_id(now),
            title: draft.title.trim().to_string(),
            content: draft.content,
            category: draft.category.trim().to_string(),
            tags: normalize_tags(draft.tags),
            project: draft
                .project
                .map(|project| project.trim().to_string())
                .filter(|project| !project.is_empty()),
            context: draft
                .context
                .into_iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .collect(),
            timestamp: now,
        };
        self.inner.append(record.clone())?;
        self.inner.save()?;
        info!(
            "memory stored (id={}, category={})",
            record.id, record.category
        );
        Ok(record)
    }

    pub fn search(
        &self,
        query: &str,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<Vec<ScoredRecord<MemoryRecord>>, StoreError> {
        self.inner.search(query, filter, limit)
    }

    pub fn get(&self, id: &str) -> Result<&MemoryRecord, StoreError> {
        self.inner.get(id)
    }

    /// Memories whose category equals `category`; possibly empty.
    pub fn list_by_category(&self, category: &str) -> Vec<&MemoryRecord> {
        self.inner.list_by_category(category)
    }

    pub fn records(&self) -> &[MemoryRecord] {
        self.inner.records()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn export(&self, filter: &RecordFilter) -> ExportDocument<MemoryRecord> {
        self.inner.export(filter)
    }

    /// Serialize an export of the memories passing `filter`.
    pub fn export_json(&self, filter: &RecordFilter) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.export(filter))?)
    }

    /// Import memories from an export document or bare array.
    ///
    /// Entries whose id is already stored are skipped. Nothing is changed if
    /// any entry fails to decode or validate, or if the flush fails.
    pub fn import(&mut self, text: &str) -> Result<ImportSummary, StoreError> {
        let decoded = self.inner.decode_import(text)?;
        let checkpoint = self.inner.checkpoint();
        match self.apply_import(decoded) {
            Ok(summary) => {
                info!(
                    "memories imported (imported={}, skipped={})",
                    summary.imported, summary.skipped
                );
                Ok(summary)
            }
            Err(err) => {
                self.inner.restore(checkpoint);
                warn!("memory import rolled back (error={err})");
                Err(err)
            }
        }
    }

    fn apply_import(&mut self, decoded: Vec<MemoryRecord>) -> Result<ImportSummary, StoreError> {
        let mut summary = ImportSummary::default();
        for mut record in decoded {
            if record.id.trim().is_empty() {
                record.set_id(memory_id(self.inner.now()));
            }
            if self.inner.contains(&record.id) {
                summary.skipped += 1;
                continue;
            }
            self.inner.append(record)?;
            summary.imported += 1;
        }
        if summary.imported > 0 {
            self.inner.save()?;
        }
        Ok(summary)
    }
}
