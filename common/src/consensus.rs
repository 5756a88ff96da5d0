//! Establish the consensus label for a data item.

use crate::metrics::percentage;
use crate::{AnnotationSnapshot, ItemSnapshot};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    /// Nobody has labeled the item yet, so there is nothing to agree on.
    #[error("No labels have been submitted for item #{item_id}.")]
    NoAnnotations { item_id: u32 },
}

/// The winning label for an item and how strongly it won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsensusResult {
    pub majority_label: String,
    pub majority_votes: usize,
    pub total_votes: usize,
}

impl ConsensusResult {
    /// Share of all votes that went to the majority label, as a percentage.
    pub fn confidence_percent(&self) -> f64 {
        percentage(self.majority_votes, self.total_votes)
    }
}

/// Count the votes for each label, keeping labels in the order they were first seen.
pub fn tally_votes(annotations: &[AnnotationSnapshot]) -> Vec<(String, usize)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut tally: Vec<(String, usize)> = Vec::new();
    for annotation in annotations {
        let label = annotation.label_name.as_str();
        match positions.get(label) {
            Some(&position) => tally[position].1 += 1,
            None => {
                positions.insert(label, tally.len());
                tally.push((label.to_string(), 1));
            }
        }
    }
    tally
}

/// Given an item's annotations, determine the majority label.
///
/// Each annotation is one vote. When several labels share the highest count,
/// the one that appears first in the item's annotation order wins, so the
/// result is stable for a given input.
///
/// # Errors
/// Returns `ConsensusError::NoAnnotations` if the item has no annotations.
pub fn resolve_consensus(item: &ItemSnapshot) -> Result<ConsensusResult, ConsensusError> {
    let total_votes = item.annotations.len();

    // A strict comparison keeps the earliest label on ties
    let (majority_label, majority_votes) = tally_votes(&item.annotations)
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
        .ok_or(ConsensusError::NoAnnotations {
            item_id: item.item_id,
        })?;

    log::debug!(
        "Item #{}: consensus {majority_label} with {majority_votes}/{total_votes} votes",
        item.item_id
    );

    Ok(ConsensusResult {
        majority_label,
        majority_votes,
        total_votes,
    })
}
