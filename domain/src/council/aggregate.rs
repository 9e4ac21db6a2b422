//! Mean-rank aggregation across raters.
//!
//! Each label's `mean_rank` is the average of its 1-based positions in the
//! submissions that mention it. Labels nobody mentioned are `Unranked` and
//! go last. Ties keep council order because the sort is stable over entries
//! that start in label order.

use crate::core::model::Model;
use crate::council::label::{AnonymizedSet, Label};
use crate::council::result::RankingSubmission;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Average position of a label, or `Unranked` when no rater mentioned it.
///
/// Serializes as a number or the string `"unranked"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeanRank {
    Ranked(f64),
    Unranked,
}

impl MeanRank {
    pub fn value(&self) -> Option<f64> {
        match self {
            MeanRank::Ranked(v) => Some(*v),
            MeanRank::Unranked => None,
        }
    }

    /// Ascending by value; `Unranked` sorts after every ranked value.
    fn order(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MeanRank::Ranked(a), MeanRank::Ranked(b)) => a.total_cmp(b),
            (MeanRank::Ranked(_), MeanRank::Unranked) => Ordering::Less,
            (MeanRank::Unranked, MeanRank::Ranked(_)) => Ordering::Greater,
            (MeanRank::Unranked, MeanRank::Unranked) => Ordering::Equal,
        }
    }
}

impl std::fmt::Display for MeanRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeanRank::Ranked(v) => write!(f, "{:.2}", v),
            MeanRank::Unranked => write!(f, "unranked"),
        }
    }
}

impl Serialize for MeanRank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MeanRank::Ranked(v) => serializer.serialize_f64(*v),
            MeanRank::Unranked => serializer.serialize_str("unranked"),
        }
    }
}

impl<'de> Deserialize<'de> for MeanRank {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(MeanRank::Ranked(v)),
            Raw::Text(s) if s == "unranked" => Ok(MeanRank::Unranked),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "expected a number or \"unranked\", got {s:?}"
            ))),
        }
    }
}

/// One row of the consensus ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub label: Label,
    pub model: Model,
    pub mean_rank: MeanRank,
    pub vote_count: usize,
}

/// Combine every rater's order into one consensus ordering.
///
/// Returns one entry per label in `set`, sorted by mean rank with ties in
/// council order. Empty or partial submissions are tolerated; labels outside
/// `set` and repeats inside one submission are ignored.
pub fn aggregate_rankings(
    submissions: &[RankingSubmission],
    set: &AnonymizedSet,
) -> Vec<AggregateEntry> {
    let mut positions: Vec<Vec<usize>> = vec![Vec::new(); set.len()];

    for submission in submissions {
        let mut seen = HashSet::new();
        let in_set = submission
            .parsed_order
            .iter()
            .filter_map(|label| set.position(label).map(|idx| (label, idx)))
            .filter(|(label, _)| seen.insert(*label));

        for (rank, (_, idx)) in in_set.enumerate() {
            positions[idx].push(rank + 1);
        }
    }

    let mut entries: Vec<AggregateEntry> = set
        .entries()
        .iter()
        .zip(positions)
        .map(|(entry, ranks)| {
            let mean_rank = if ranks.is_empty() {
                MeanRank::Unranked
            } else {
                MeanRank::Ranked(ranks.iter().sum::<usize>() as f64 / ranks.len() as f64)
            };
            AggregateEntry {
                label: entry.label.clone(),
                model: entry.model.clone(),
                mean_rank,
                vote_count: ranks.len(),
            }
        })
        .collect();

    entries.sort_by(|a, b| a.mean_rank.order(&b.mean_rank));
    entries
}
