//! Lexical relevance scoring.
//!
//! Every signal is a case-insensitive comparison between the query and one
//! record field. The content signal treats the raw query as a regular
//! expression and counts non-overlapping matches; a query that does not
//! compile contributes nothing to that signal and leaves the others intact.

use crate::error::StoreError;
use crate::record::{ScoreFields, ScoringWeights};
use log::debug;
use regex::{Regex, RegexBuilder};

/// Compile the raw query as a case-insensitive pattern.
pub fn compile_query_pattern(query: &str) -> Result<Regex, StoreError> {
    RegexBuilder::new(query)
        .case_insensitive(true)
        .build()
        .map_err(|err| StoreError::Pattern(err.to_string()))
}

/// Scores records against one query with a fixed set of weights.
#[derive(Debug, Clone)]
pub struct Scorer {
    needle: String,
    pattern: Option<Regex>,
    weights: ScoringWeights,
}

impl Scorer {
    /// Prepare a scorer; the pattern is compiled once and reused per record.
    pub fn new(query: &str, weights: ScoringWeights) -> Self {
        let pattern = match compile_query_pattern(query) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                debug!("content signal disabled (query={query:?}, error={err})");
                None
            }
        };
        Self {
            needle: query.to_lowercase(),
            pattern,
            weights,
        }
    }

    /// Whether the content signal is active for this query.
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    /// Total relevance of one record; zero means not relevant.
    pub fn score(&self, fields: &ScoreFields<'_>) -> u32 {
        let weights = &self.weights;
        let needle = self.needle.as_str();
        let mut score = 0u32;

        if contains_lower(fields.title, needle) {
            score = score.saturating_add(weights.title);
        }

        let tag_hits = fields
            .tags
            .iter()
            .map(|tag| tag.to_lowercase())
            .filter(|tag| !tag.is_empty() && (tag.contains(needle) || needle.contains(tag.as_str())))
            .count();
        score = score.saturating_add(weights.tag.saturating_mul(count_u32(tag_hits)));

        if contains_lower(fields.category, needle) {
            score = score.saturating_add(weights.category);
        }

        if let Some(pattern) = &self.pattern {
            // Zero-width matches count too: `x?` matches at every char
            // boundary, so it scores every record on content alone.
            let matches = pattern.find_iter(fields.content).count();
            score = score.saturating_add(weights.content.saturating_mul(count_u32(matches)));
        }

        if contains_lower(&fields.supplementary, needle) {
            score = score.saturating_add(weights.supplementary);
        }

        if weights.example > 0 {
            let example_hits = fields
                .examples
                .iter()
                .filter(|example| contains_lower(example, needle))
                .count();
            score = score.saturating_add(weights.example.saturating_mul(count_u32(example_hits)));
        }

        score
    }
}

fn contains_lower(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{Scorer, compile_query_pattern};
    use crate::StoreError;
    use crate::record::{ScoreFields, ScoringWeights};
    use pretty_assertions::assert_eq;
    use std::borrow::Cow;

    fn fields<'a>(
        title: &'a str,
        category: &'a str,
        tags: &'a [String],
        content: &'a str,
        supplementary: &'a str,
        examples: &'a [String],
    ) -> ScoreFields<'a> {
        ScoreFields {
            title,
            category,
            tags,
            content,
            supplementary: Cow::Borrowed(supplementary),
            examples,
        }
    }

    #[test]
    fn title_match_is_case_insensitive() {
        let scorer = Scorer::new("AUTH", ScoringWeights::MEMORY);
        let score = scorer.score(&fields("User Authentication", "", &[], "", "", &[]));
        assert_eq!(score, 50);
    }

    #[test]
    fn tags_count_each_containment_direction() {
        let tags = vec![
            "auth".to_string(),
            "oauth2".to_string(),
            "db".to_string(),
            String::new(),
        ];
        let memory = Scorer::new("auth", ScoringWeights::MEMORY);
        let rule = Scorer::new("auth", ScoringWeights::RULE);
        let view = fields("", "", &tags, "", "", &[]);
        assert_eq!(memory.score(&view), 60);
        assert_eq!(rule.score(&view), 80);

        let short_tag = vec!["git".to_string()];
        let scorer = Scorer::new("git rebase", ScoringWeights::MEMORY);
        assert_eq!(scorer.score(&fields("", "", &short_tag, "", "", &[])), 30);
    }

    #[test]
    fn content_counts_non_overlapping_matches() {
        let memory = Scorer::new("ab", ScoringWeights::MEMORY);
        let rule = Scorer::new("ab", ScoringWeights::RULE);
        let view = fields("", "", &[], "AB ab aBab", "", &[]);
        assert_eq!(memory.score(&view), 80);
        assert_eq!(rule.score(&view), 60);
    }

    #[test]
    fn empty_matching_pattern_counts_every_boundary() {
        let scorer = Scorer::new("x?", ScoringWeights::MEMORY);
        assert_eq!(scorer.score(&fields("", "", &[], "abc", "", &[])), 80);
        assert_eq!(scorer.score(&fields("", "", &[], "", "", &[])), 20);
    }

    #[test]
    fn content_uses_query_as_pattern() {
        let scorer = Scorer::new("err(or)?", ScoringWeights::MEMORY);
        let view = fields("", "", &[], "error then err", "", &[]);
        assert_eq!(scorer.score(&view), 40);
    }

    #[test]
    fn invalid_pattern_only_disables_content_signal() {
        let scorer = Scorer::new("fn(", ScoringWeights::RULE);
        assert_eq!(scorer.has_pattern(), false);
        let view = fields("call fn(x)", "", &[], "fn( fn( fn(", "", &[]);
        assert_eq!(scorer.score(&view), 50);
    }

    #[test]
    fn compile_reports_pattern_error() {
        let err = compile_query_pattern("[unclosed").expect_err("invalid");
        assert!(matches!(err, StoreError::Pattern(_)));
    }

    #[test]
    fn category_and_supplementary_use_variant_weights() {
        let view = fields("", "Security", &[], "", "see security notes", &[]);
        assert_eq!(Scorer::new("secur", ScoringWeights::MEMORY).score(&view), 50);
        assert_eq!(Scorer::new("secur", ScoringWeights::RULE).score(&view), 55);
    }

    #[test]
    fn examples_only_count_for_rules() {
        let examples = vec![
            "cargo fmt --check".to_string(),
            "run fmt before commit".to_string(),
            "clippy".to_string(),
        ];
        let view = fields("", "", &[], "", "", &examples);
        assert_eq!(Scorer::new("fmt", ScoringWeights::RULE).score(&view), 20);
        assert_eq!(Scorer::new("fmt", ScoringWeights::MEMORY).score(&view), 0);
    }

    #[test]
    fn unrelated_record_scores_zero() {
        let tags = vec!["docs".to_string()];
        let view = fields("Readme layout", "documentation", &tags, "headings", "", &[]);
        assert_eq!(Scorer::new("kubernetes", ScoringWeights::RULE).score(&view), 0);
    }
}
