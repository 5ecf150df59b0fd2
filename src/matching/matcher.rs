// src/matching/matcher.rs - Joining two keyed record sets
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use strsim::levenshtein;

use crate::error::{MatchingError, MatchingResult};
use crate::models::core::{KeyedRecord, MatchPair, UnmatchedRecord};
use crate::utils::progress_bars::logging::MatchingLogger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Keys must be equal. Every right row carrying the key becomes a pair.
    #[default]
    Exact,
    /// Closest right key by edit distance. Without `max_distance` every left
    /// record matches something.
    Fuzzy {
        #[serde(default)]
        max_distance: Option<usize>,
    },
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::Exact => write!(f, "exact"),
            MatchStrategy::Fuzzy {
                max_distance: Some(d),
            } => write!(f, "fuzzy(max_distance={})", d),
            MatchStrategy::Fuzzy { max_distance: None } => write!(f, "fuzzy"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub pairs: Vec<MatchPair>,
    pub unmatched: Vec<UnmatchedRecord>,
}

impl MatchOutcome {
    /// Number of distinct left identifiers that produced at least one pair.
    pub fn matched_left_count(&self) -> usize {
        self.pairs
            .iter()
            .map(|p| p.left_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Candidate with the smallest edit distance to `key`; the earliest one wins
/// ties. `None` only when there are no candidates.
pub fn find_best_match<'a, I>(key: &str, candidates: I) -> Option<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, usize)> = None;
    for candidate in candidates {
        let distance = levenshtein(key, candidate);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
        if distance == 0 {
            break;
        }
    }
    best
}

/// Joins `left` against `right` on their keys.
///
/// Every left record ends up either in at least one pair or in `unmatched`,
/// never both. Pairs come out in left order, and for each left record in
/// right order.
pub fn match_records(
    left: &[KeyedRecord],
    right: &[KeyedRecord],
    strategy: MatchStrategy,
    logger: &MatchingLogger,
) -> MatchingResult<MatchOutcome> {
    if left.is_empty() || right.is_empty() {
        return Err(MatchingError::EmptyInput {
            left: left.len(),
            right: right.len(),
        });
    }

    // Key -> right rows in their original order.
    let mut right_index: HashMap<&str, Vec<&KeyedRecord>> = HashMap::new();
    let mut right_keys: Vec<&str> = Vec::new();
    for record in right {
        let key = record.key.as_str();
        let rows = right_index.entry(key).or_default();
        if rows.is_empty() {
            right_keys.push(key);
        }
        rows.push(record);
    }
    logger.log_debug(&format!(
        "Indexed {} right records under {} distinct keys",
        right.len(),
        right_keys.len()
    ));

    let total = left.len();
    let mut pairs = Vec::new();
    let mut fuzzy_rejected = 0usize;

    for (i, left_record) in left.iter().enumerate() {
        let key = left_record.key.as_str();
        match strategy {
            MatchStrategy::Exact => {
                if let Some(rows) = right_index.get(key) {
                    pairs.extend(rows.iter().map(|r| MatchPair::new(left_record, r, 0)));
                }
            }
            MatchStrategy::Fuzzy { max_distance } => {
                if let Some((best_key, distance)) =
                    find_best_match(key, right_keys.iter().copied())
                {
                    if max_distance.map_or(true, |max| distance <= max) {
                        if let Some(rows) = right_index.get(best_key) {
                            pairs.extend(
                                rows.iter().map(|r| MatchPair::new(left_record, r, distance)),
                            );
                        }
                    } else {
                        fuzzy_rejected += 1;
                    }
                }
            }
        }
        logger.log_progress_update(i + 1, total, Some("matching"));
    }

    if fuzzy_rejected > 0 {
        logger.log_debug(&format!(
            "{} left records had no key within the distance threshold",
            fuzzy_rejected
        ));
    }

    let matched_ids: HashSet<&str> = pairs.iter().map(|p| p.left_id.as_str()).collect();
    let unmatched: Vec<UnmatchedRecord> = left
        .iter()
        .filter(|r| !matched_ids.contains(r.identifier()))
        .map(UnmatchedRecord::from)
        .collect();

    Ok(MatchOutcome { pairs, unmatched })
}
