//! Ranking and truncation of scored candidates.

use serde::Serialize;

/// Result count used when a caller does not supply a limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// A record paired with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRecord<R> {
    pub record: R,
    pub score: u32,
}

/// Drop zero scores, order by descending score and keep at most `limit`.
///
/// The sort is stable, so equal scores keep the order they arrived in.
pub fn rank<R>(candidates: Vec<ScoredRecord<R>>, limit: usize) -> Vec<ScoredRecord<R>> {
    let mut ranked: Vec<ScoredRecord<R>> = candidates
        .into_iter()
        .filter(|candidate| candidate.score > 0)
        .collect();
    ranked.sort_by(|left, right| right.score.cmp(&left.score));
    ranked.truncate(limit);
    ranked
}
