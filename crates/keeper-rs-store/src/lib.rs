//! Scored retrieval over memory and rule stores.
//!
//! Both stores share one pipeline: filter the collection, score each survivor
//! against the query, then rank and truncate. Each store is persisted as a
//! single JSON snapshot that is rewritten on every mutation.

pub mod category;
pub mod clock;
pub mod error;
pub mod filter;
pub mod ids;
pub mod memory;
pub mod rank;
pub mod record;
pub mod rules;
pub mod scorer;
pub mod storage;
pub mod store;

/// Category index types.
pub use category::{Category, CategoryIndex, CategorySummary};
/// Time source.
pub use clock::{Clock, SystemClock};
/// Store error type.
pub use error::StoreError;
/// Pre-scoring filter.
pub use filter::RecordFilter;
/// Memory variant.
pub use memory::{MemoryDraft, MemoryRecord, MemoryStore};
/// Ranking output.
pub use rank::{DEFAULT_SEARCH_LIMIT, ScoredRecord};
/// Record abstraction.
pub use record::{Record, ScoringWeights};
/// Rule variant.
pub use rules::{DEFAULT_RULE_VERSION, RuleDraft, RulePatch, RuleRecord, RuleStore, RuleStoreOptions};
/// Persistence collaborator.
pub use storage::{FsStorage, SnapshotStorage};
/// Generic store and import/export documents.
pub use store::{ExportDocument, ImportSummary, RecordStore};
