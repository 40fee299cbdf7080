//! Record abstraction shared by the memory and rule stores.

use keeper_rs_protocol::StoreKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// Per-signal weights used by the relevance scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    /// Query found in the title.
    pub title: u32,
    /// Each tag in substring containment with the query.
    pub tag: u32,
    /// Query found in the category.
    pub category: u32,
    /// Each pattern match in the content body.
    pub content: u32,
    /// Query found in the supplementary text (memory context, rule description).
    pub supplementary: u32,
    /// Each example containing the query.
    pub example: u32,
}

impl ScoringWeights {
    /// Weights for experience memories.
    pub const MEMORY: ScoringWeights = ScoringWeights {
        title: 50,
        tag: 30,
        category: 25,
        content: 20,
        supplementary: 25,
        example: 0,
    };

    /// Weights for rule entries.
    pub const RULE: ScoringWeights = ScoringWeights {
        title: 50,
        tag: 40,
        category: 30,
        content: 15,
        supplementary: 25,
        example: 10,
    };
}

/// Borrowed view of the text a record exposes to the scorer.
#[derive(Debug, Clone)]
pub struct ScoreFields<'a> {
    pub title: &'a str,
    pub category: &'a str,
    pub tags: &'a [String],
    pub content: &'a str,
    pub supplementary: Cow<'a, str>,
    pub examples: &'a [String],
}

/// A stored record that can be filtered, scored, and persisted.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection this record type belongs to.
    const KIND: StoreKind;
    /// Scoring weights for this record type.
    const WEIGHTS: ScoringWeights;

    /// Unique record id.
    fn id(&self) -> &str;

    /// Replace the record id (used when backfilling imports).
    fn set_id(&mut self, id: String);

    /// Category partition key.
    fn category(&self) -> &str;

    /// Record tags in insertion order.
    fn tags(&self) -> &[String];

    /// Project the record belongs to, if the variant tracks one.
    fn project(&self) -> Option<&str> {
        None
    }

    /// Fields consulted by the relevance scorer.
    fn score_fields(&self) -> ScoreFields<'_>;

    /// Reject a record with a blank required field, as `create` would.
    fn validate(&self) -> Result<(), crate::StoreError> {
        let fields = self.score_fields();
        require_field("title", fields.title)?;
        require_field("content", fields.content)?;
        require_field("category", fields.category)
    }
}

/// Trim tags and drop blanks, keeping order.
pub(crate) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Reject blank required fields.
pub(crate) fn require_field(name: &str, value: &str) -> Result<(), crate::StoreError> {
    if value.trim().is_empty() {
        return Err(crate::StoreError::Validation(format!(
            "{name} is required"
        )));
    }
    Ok(())
}
