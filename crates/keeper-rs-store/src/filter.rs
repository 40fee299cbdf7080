//! Structured pre-filtering applied before scoring.

use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Optional constraints on category, tags, and project.
///
/// Dimensions combine with AND; requested tags combine with OR. All
/// comparisons are case-insensitive substring checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Substring the record category must contain.
    #[serde(default)]
    pub category: Option<String>,
    /// Tags of which at least one must overlap a record tag.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Substring the record project must contain.
    #[serde(default)]
    pub project: Option<String>,
}

impl RecordFilter {
    /// Filter on category only.
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Whether no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        non_blank(self.category.as_deref()).is_none()
            && non_blank(self.project.as_deref()).is_none()
            && self.requested_tags().next().is_none()
    }

    /// Whether a record satisfies every supplied constraint.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        if let Some(category) = non_blank(self.category.as_deref())
            && !contains_ci(record.category(), category)
        {
            return false;
        }

        if let Some(project) = non_blank(self.project.as_deref()) {
            match record.project() {
                Some(record_project) if contains_ci(record_project, project) => {}
                _ => return false,
            }
        }

        let mut requested = self.requested_tags().peekable();
        if requested.peek().is_some() {
            let record_tags: Vec<String> = record
                .tags()
                .iter()
                .map(|tag| tag.to_lowercase())
                .collect();
            let overlaps = requested.any(|wanted| {
                let wanted = wanted.to_lowercase();
                record_tags
                    .iter()
                    .any(|tag| tag.contains(&wanted) || wanted.contains(tag.as_str()))
            });
            if !overlaps {
                return false;
            }
        }

        true
    }

    /// Records satisfying the filter, in their original order.
    pub fn apply<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|record| self.matches(*record)).collect()
    }

    fn requested_tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
