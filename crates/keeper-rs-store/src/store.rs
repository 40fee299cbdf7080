//! Generic record store shared by the memory and rule variants.
//!
//! The store owns an ordered in-memory collection and flushes the whole of it
//! to one backing file after every mutation. Search runs the
//! filter, score, rank pipeline over that collection.

use crate::category::CategoryIndex;
use crate::clock::Clock;
use crate::error::StoreError;
use crate::filter::RecordFilter;
use crate::ids::IdCounters;
use crate::rank::{ScoredRecord, rank};
use crate::record::Record;
use crate::scorer::Scorer;
use crate::storage::SnapshotStorage;
use chrono::{DateTime, Utc};
use keeper_rs_protocol::StoreKind;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// On-disk document read back from the backing file.
#[derive(Debug, Deserialize)]
#[serde(bound = "R: Record")]
struct Snapshot<R> {
    #[serde(default)]
    records: Vec<R>,
    #[serde(default)]
    categories: CategoryIndex,
    #[serde(default)]
    counters: IdCounters,
}

/// Borrowed view written to the backing file.
#[derive(Serialize)]
struct SnapshotRef<'a, R: Record> {
    records: &'a [R],
    #[serde(skip_serializing_if = "no_categories")]
    categories: &'a CategoryIndex,
    #[serde(skip_serializing_if = "no_counters")]
    counters: &'a IdCounters,
}

fn no_categories(categories: &&CategoryIndex) -> bool {
    categories.is_empty()
}

fn no_counters(counters: &&IdCounters) -> bool {
    counters.is_empty()
}

/// Document produced by `export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "R: Record")]
pub struct ExportDocument<R> {
    pub kind: StoreKind,
    pub exported_at: DateTime<Utc>,
    pub count: usize,
    pub records: Vec<R>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Saved copy of a store's mutable state, used to undo a failed bulk change.
#[derive(Debug)]
pub(crate) struct Checkpoint<R> {
    records: Vec<R>,
    categories: CategoryIndex,
    counters: IdCounters,
}

/// In-memory record collection backed by a snapshot file.
#[derive(Debug)]
pub struct RecordStore<R: Record> {
    path: PathBuf,
    storage: Arc<dyn SnapshotStorage>,
    clock: Arc<dyn Clock>,
    records: Vec<R>,
    categories: CategoryIndex,
    counters: IdCounters,
}

impl<R: Record> RecordStore<R> {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store. An unreadable or malformed file
    /// is logged and also yields an empty store.
    pub fn load(
        path: impl Into<PathBuf>,
        storage: Arc<dyn SnapshotStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let path = path.into();
        let snapshot = match storage.read(&path) {
            Ok(Some(contents)) => match serde_json::from_str::<Snapshot<R>>(&contents) {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    warn!(
                        "backing file is malformed, starting empty (kind={}, path={}, error={})",
                        R::KIND,
                        path.display(),
                        err
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(
                    "backing file unreadable, starting empty (kind={}, path={}, error={})",
                    R::KIND,
                    path.display(),
                    err
                );
                None
            }
        };
        let (records, categories, counters) = match snapshot {
            Some(snapshot) => (snapshot.records, snapshot.categories, snapshot.counters),
            None => Default::default(),
        };
        debug!(
            "store loaded (kind={}, path={}, records={})",
            R::KIND,
            path.display(),
            records.len()
        );
        Self {
            path,
            storage,
            clock,
            records,
            categories,
            counters,
        }
    }

    /// Flush the full collection to the backing file.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            self.storage.ensure_dir(parent)?;
        }
        let snapshot = SnapshotRef {
            records: &self.records,
            categories: &self.categories,
            counters: &self.counters,
        };
        let contents = serde_json::to_string_pretty(&snapshot)?;
        self.storage.write(&self.path, &contents)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn storage(&self) -> &Arc<dyn SnapshotStorage> {
        &self.storage
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|record| record.id() == id)
    }

    /// Record with the given id.
    pub fn get(&self, id: &str) -> Result<&R, StoreError> {
        self.records
            .iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| not_found::<R>(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut R, StoreError> {
        self.records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| not_found::<R>(id))
    }

    /// Append a record; the id must not already be stored.
    pub fn append(&mut self, record: R) -> Result<(), StoreError> {
        if self.contains(record.id()) {
            return Err(StoreError::DuplicateId(record.id().to_string()));
        }
        self.records.push(record);
        Ok(())
    }

    /// Remove and return the record with the given id.
    pub fn remove(&mut self, id: &str) -> Result<R, StoreError> {
        let position = self
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| not_found::<R>(id))?;
        Ok(self.records.remove(position))
    }

    /// Records whose category equals `category` exactly, in insertion order.
    pub fn list_by_category(&self, category: &str) -> Vec<&R> {
        self.records
            .iter()
            .filter(|record| record.category() == category)
            .collect()
    }

    /// Records passing `filter`, in insertion order.
    pub fn filter(&self, filter: &RecordFilter) -> Vec<&R> {
        filter.apply(&self.records)
    }

    /// Filter, score, rank and truncate.
    ///
    /// A blank query is rejected; a query that matches nothing yields an
    /// empty result.
    pub fn search(
        &self,
        query: &str,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<Vec<ScoredRecord<R>>, StoreError> {
        if query.trim().is_empty() {
            return Err(StoreError::Validation("query must not be empty".to_string()));
        }
        let scorer = Scorer::new(query, R::WEIGHTS);
        let candidates = self
            .filter(filter)
            .into_iter()
            .map(|record| ScoredRecord {
                score: scorer.score(&record.score_fields()),
                record: record.clone(),
            })
            .collect();
        let results = rank(candidates, limit);
        debug!(
            "search complete (kind={}, query={:?}, results={})",
            R::KIND,
            query,
            results.len()
        );
        Ok(results)
    }

    /// Build an export document of the records passing `filter`.
    pub fn export(&self, filter: &RecordFilter) -> ExportDocument<R> {
        let records: Vec<R> = self.filter(filter).into_iter().cloned().collect();
        ExportDocument {
            kind: R::KIND,
            exported_at: self.clock.now(),
            count: records.len(),
            records,
        }
    }

    /// Decode an import payload into records without touching the store.
    ///
    /// Accepts an export document or a bare array. Missing timestamps are
    /// filled with the current time and missing ids are left empty for the
    /// caller to assign. Every entry must carry the fields `create` requires.
    pub fn decode_import(&self, text: &str) -> Result<Vec<R>, StoreError> {
        let value: Value = serde_json::from_str(text)?;
        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut object) => match object.remove("records") {
                Some(Value::Array(entries)) => entries,
                _ => {
                    return Err(StoreError::Validation(
                        "import document must contain a records array".to_string(),
                    ));
                }
            },
            _ => {
                return Err(StoreError::Validation(
                    "import payload must be an array or an export document".to_string(),
                ));
            }
        };

        let now = Value::String(self.clock.now().to_rfc3339());
        let mut decoded = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let Value::Object(mut object) = entry else {
                return Err(StoreError::Validation(format!(
                    "import entry {index} is not an object"
                )));
            };
            if !matches!(object.get("timestamp"), Some(Value::String(_))) {
                object.insert("timestamp".to_string(), now.clone());
            }
            if !matches!(object.get("id"), Some(Value::String(_))) {
                object.insert("id".to_string(), Value::String(String::new()));
            }
            let record: R = serde_json::from_value(Value::Object(object)).map_err(|err| {
                StoreError::Validation(format!("import entry {index}: {err}"))
            })?;
            record.validate().map_err(|err| match err {
                StoreError::Validation(message) => {
                    StoreError::Validation(format!("import entry {index}: {message}"))
                }
                other => other,
            })?;
            decoded.push(record);
        }
        Ok(decoded)
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut CategoryIndex {
        &mut self.categories
    }

    pub fn counters(&self) -> &IdCounters {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut IdCounters {
        &mut self.counters
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint<R> {
        Checkpoint {
            records: self.records.clone(),
            categories: self.categories.clone(),
            counters: self.counters.clone(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint<R>) {
        self.records = checkpoint.records;
        self.categories = checkpoint.categories;
        self.counters = checkpoint.counters;
    }

    /// Split borrow of the pieces rule id allocation needs.
    pub(crate) fn allocation_parts(&mut self) -> (&[R], &mut IdCounters) {
        (&self.records, &mut self.counters)
    }
}

fn not_found<R: Record>(id: &str) -> StoreError {
    StoreError::NotFound {
        noun: R::KIND.record_noun(),
        id: id.to_string(),
    }
}
