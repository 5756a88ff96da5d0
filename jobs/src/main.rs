//! Scheduled jobs for the labeling workflow: report consensus and validation progress.

#![warn(clippy::all, clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use labeling_common::ItemSnapshot;
use labeling_common::config::Settings;
use labeling_common::db_util;
use labeling_common::progress::{self, ConsensusReport, ItemProgress};
use serde_json::json;

/// Report consensus and validation progress for every active data item.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Skip items whose annotations have all been validated
    #[arg(long, env = "LABELING_ONLY_INCOMPLETE")]
    only_incomplete: bool,

    /// Print one JSON object per item instead of a summary line
    #[arg(long, env = "LABELING_JSON")]
    json: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Totals {
    items: usize,
    fully_validated: usize,
    without_votes: usize,
}

/// Build both reports for one item. Items nobody has labeled have no consensus.
fn report_item(snapshot: &ItemSnapshot) -> (ItemProgress, Option<ConsensusReport>) {
    (
        progress::item_progress(snapshot),
        progress::consensus_report(snapshot).ok(),
    )
}

fn summary_line(item_progress: &ItemProgress, consensus: Option<&ConsensusReport>) -> String {
    let consensus = match consensus {
        Some(c) => format!(
            "consensus {} ({} of {} votes)",
            c.consensus_label, c.confidence, c.total_votes
        ),
        None => "no votes".to_string(),
    };
    format!(
        "Item #{}: {consensus}, {} validated ({}/{}), {} approved",
        item_progress.item_id,
        item_progress.validation_progress,
        item_progress.validated_count,
        item_progress.annotation_count,
        item_progress.approved_count
    )
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = Settings::from_env().context("Invalid configuration")?;
    let mut conn = db_util::get_database_connection(&settings)
        .context("Could not connect to the database")?;
    log::info!("Database connection established. Scheduled jobs started.");

    let snapshots = db_util::get_active_item_snapshots(&mut conn)
        .context("Could not load active data items")?;

    let mut totals = Totals::default();
    for snapshot in &snapshots {
        let (item_progress, consensus) = report_item(snapshot);
        totals.items += 1;
        if item_progress.is_fully_validated {
            totals.fully_validated += 1;
            if cli.only_incomplete {
                continue;
            }
        }
        if consensus.is_none() {
            totals.without_votes += 1;
        }

        if cli.json {
            println!(
                "{}",
                json!({ "progress": item_progress, "consensus": consensus })
            );
        } else {
            log::info!("{}", summary_line(&item_progress, consensus.as_ref()));
        }
    }

    log::info!(
        "Final: {} active items, {} fully validated, {} without votes",
        totals.items,
        totals.fully_validated,
        totals.without_votes
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use labeling_common::{AnnotationSnapshot, ValidationSnapshot};

    fn snapshot(labels: &[(&str, Option<bool>)]) -> ItemSnapshot {
        ItemSnapshot {
            item_id: 11,
            annotations: labels
                .iter()
                .zip(1u32..)
                .map(|((label, validation), id)| AnnotationSnapshot {
                    annotation_id: id,
                    label_name: (*label).to_string(),
                    validation: validation.map(|is_approved| ValidationSnapshot {
                        validation_id: id,
                        is_approved,
                    }),
                })
                .collect(),
        }
    }

    #[test]
    fn test_report_item_without_votes() {
        let (item_progress, consensus) = report_item(&snapshot(&[]));
        assert!(consensus.is_none());
        assert_eq!(
            summary_line(&item_progress, consensus.as_ref()),
            "Item #11: no votes, 0.00% validated (0/0), 0 approved"
        );
    }

    #[test]
    fn test_report_item_with_votes() {
        let (item_progress, consensus) = report_item(&snapshot(&[
            ("cat", Some(true)),
            ("cat", None),
            ("dog", Some(false)),
        ]));
        assert_eq!(
            summary_line(&item_progress, consensus.as_ref()),
            "Item #11: consensus cat (66.67% of 3 votes), 66.67% validated (2/3), 1 approved"
        );
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["labeling_jobs", "--only-incomplete", "--json"]);
        assert!(cli.only_incomplete);
        assert!(cli.json);
    }
}
