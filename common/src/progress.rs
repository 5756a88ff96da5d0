//! Reporting views for item progress, user statistics and consensus.
//! Percentages leave this module as strings with two decimals and a `%` suffix.

use crate::consensus::{self, ConsensusError};
use crate::metrics;
use crate::{ItemSnapshot, Role, UserSnapshot};
use serde::{Deserialize, Serialize};

/// Render a percentage the way every report shows it, e.g. `66.67%`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProgress {
    pub item_id: u32,
    pub annotation_count: usize,
    pub validated_count: usize,
    pub approved_count: usize,
    pub is_fully_validated: bool,
    pub validation_progress: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub username: String,
    pub role: Role,
    pub total_annotations: usize,
    pub approved_annotations: usize,
    pub rejected_annotations: usize,
    pub pending_validations: usize,
    pub precision: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusReport {
    pub consensus_label: String,
    pub confidence: String,
    pub total_votes: usize,
}

pub fn item_progress(item: &ItemSnapshot) -> ItemProgress {
    ItemProgress {
        item_id: item.item_id,
        annotation_count: metrics::annotation_count(item),
        validated_count: metrics::validated_count(item),
        approved_count: metrics::approved_count(item),
        is_fully_validated: metrics::is_fully_validated(item),
        validation_progress: format_percent(metrics::validation_progress(item)),
    }
}

pub fn user_stats(user: &UserSnapshot) -> UserStats {
    UserStats {
        username: user.username.clone(),
        role: user.role,
        total_annotations: metrics::total_annotations(user),
        approved_annotations: metrics::approved_annotations(user),
        rejected_annotations: metrics::rejected_annotations(user),
        pending_validations: metrics::pending_validations(user),
        precision: format_percent(metrics::precision(user)),
    }
}

/// # Errors
/// Returns `ConsensusError::NoAnnotations` if the item has no annotations.
pub fn consensus_report(item: &ItemSnapshot) -> Result<ConsensusReport, ConsensusError> {
    let result = consensus::resolve_consensus(item)?;
    Ok(ConsensusReport {
        confidence: format_percent(result.confidence_percent()),
        consensus_label: result.majority_label,
        total_votes: result.total_votes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{annotation, item};

    #[test_log::test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(100.0), "100.00%");
        assert_eq!(format_percent(200.0 / 3.0), "66.67%");
        assert_eq!(format_percent(100.0 / 3.0), "33.33%");
    }

    #[test_log::test]
    fn test_item_progress_partial() {
        let snapshot = ItemSnapshot {
            item_id: 12,
            annotations: vec![
                annotation(1, "cat", Some(true)),
                annotation(2, "dog", Some(false)),
                annotation(3, "cat", None),
            ],
        };
        let progress = item_progress(&snapshot);
        assert_eq!(
            progress,
            ItemProgress {
                item_id: 12,
                annotation_count: 3,
                validated_count: 2,
                approved_count: 1,
                is_fully_validated: false,
                validation_progress: "66.67%".to_string(),
            }
        );
    }

    #[test_log::test]
    fn test_item_progress_without_annotations() {
        let progress = item_progress(&item(4, &[]));
        assert_eq!(progress.annotation_count, 0);
        assert!(!progress.is_fully_validated);
        assert_eq!(progress.validation_progress, "0.00%");
    }

    #[test_log::test]
    fn test_user_stats_payload() {
        let mut annotations = Vec::new();
        for id in 1..=6 {
            annotations.push(annotation(id, "cat", Some(true)));
        }
        annotations.push(annotation(7, "dog", Some(false)));
        for id in 8..=10 {
            annotations.push(annotation(id, "cat", None));
        }
        let user = UserSnapshot {
            user_id: 1,
            username: "bob".to_string(),
            role: Role::Contributor,
            annotations,
        };

        let stats = user_stats(&user);
        assert_eq!(stats.total_annotations, 10);
        assert_eq!(stats.approved_annotations, 6);
        assert_eq!(stats.rejected_annotations, 1);
        assert_eq!(stats.pending_validations, 3);
        assert_eq!(stats.precision, "60.00%");

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["role"], "contributor");
        assert_eq!(json["precision"], "60.00%");
    }

    #[test_log::test]
    fn test_consensus_report() {
        let report = consensus_report(&item(3, &["A", "A", "B"])).unwrap();
        assert_eq!(
            report,
            ConsensusReport {
                consensus_label: "A".to_string(),
                confidence: "66.67%".to_string(),
                total_votes: 3,
            }
        );
        assert_eq!(
            consensus_report(&item(3, &[])),
            Err(ConsensusError::NoAnnotations { item_id: 3 })
        );
    }

    #[test_log::test]
    fn test_views_are_idempotent() {
        let snapshot = item(5, &["A", "B", "B"]);
        assert_eq!(item_progress(&snapshot), item_progress(&snapshot));
        assert_eq!(consensus_report(&snapshot), consensus_report(&snapshot));
    }
}
