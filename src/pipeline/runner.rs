//! End-to-end run: read the three extracts, clean them leaf-first, and
//! consolidate.

use crate::config::CleaningRules;
use crate::error::{PipelineError, Result};
use crate::processing::{
    Dataset, QualityMetrics, consolidate, process_feedback, process_inventory,
    process_transactions,
};
use crate::table::load_table;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const DEFAULT_INVENTORY_FILE: &str = "inventario_central_v2.csv";
pub const DEFAULT_FEEDBACK_FILE: &str = "feedback_clientes_v2.csv";
pub const DEFAULT_TRANSACTIONS_FILE: &str = "transacciones_logistica_v2.csv";

/// Locations of the three extracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub inventory: PathBuf,
    pub feedback: PathBuf,
    pub transactions: PathBuf,
}

impl SourcePaths {
    /// The default extract names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            inventory: dir.join(DEFAULT_INVENTORY_FILE),
            feedback: dir.join(DEFAULT_FEEDBACK_FILE),
            transactions: dir.join(DEFAULT_TRANSACTIONS_FILE),
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub consolidated: DataFrame,
    pub inventory: DataFrame,
    pub feedback: DataFrame,
    pub transactions: DataFrame,
    /// Serialized keys are `inventario`, `transacciones` and `feedback`
    pub metrics: BTreeMap<Dataset, QualityMetrics>,
    pub duration: Duration,
}

impl PipelineOutput {
    pub fn metrics_for(&self, dataset: Dataset) -> Option<&QualityMetrics> {
        self.metrics.get(&dataset)
    }

    /// One line per dataset with its before/after health.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Consolidated {} transactions in {:.2}s",
            self.consolidated.height(),
            self.duration.as_secs_f64()
        )];
        for (dataset, metrics) in &self.metrics {
            lines.push(format!(
                "  {dataset}: health {:.2} -> {:.2} ({:+.2})",
                metrics.score_before, metrics.score_after, metrics.improvement
            ));
        }
        lines.join("\n")
    }
}

fn read_source(dataset: Dataset, path: &Path) -> Result<DataFrame> {
    tracing::info!("Loading {dataset} extract from {}", path.display());
    load_table(path).map_err(|e| {
        tracing::error!("Failed to read {dataset} extract: {e:#}");
        PipelineError::source_read(dataset.key(), format!("{e:#}"))
    })
}

/// Read the three extracts and run the full cleaning and consolidation.
///
/// # Errors
///
/// Returns [`PipelineError::SourceRead`] naming the dataset when an extract
/// cannot be read; nothing is produced in that case.
pub fn run_pipeline(paths: &SourcePaths, rules: &CleaningRules) -> Result<PipelineOutput> {
    let start = Instant::now();
    let inventory = read_source(Dataset::Inventory, &paths.inventory)?;
    let feedback = read_source(Dataset::Feedback, &paths.feedback)?;
    let transactions = read_source(Dataset::Transactions, &paths.transactions)?;
    let mut output = run_from_tables(inventory, feedback, transactions, rules)?;
    output.duration = start.elapsed();
    Ok(output)
}

/// Run cleaning and consolidation over tables that are already loaded.
///
/// # Errors
///
/// Fails only on internal table-engine errors.
pub fn run_from_tables(
    inventory: DataFrame,
    feedback: DataFrame,
    transactions: DataFrame,
    rules: &CleaningRules,
) -> Result<PipelineOutput> {
    let start = Instant::now();
    let (inventory, inventory_metrics) = process_inventory(inventory, rules)?;
    let (feedback, feedback_metrics) = process_feedback(feedback, rules)?;
    let (transactions, transaction_metrics) =
        process_transactions(transactions, &inventory, &feedback, rules)?;
    let consolidated = consolidate(&transactions, &inventory, &feedback, rules)?;

    let metrics = BTreeMap::from([
        (Dataset::Inventory, inventory_metrics),
        (Dataset::Transactions, transaction_metrics),
        (Dataset::Feedback, feedback_metrics),
    ]);
    let output = PipelineOutput {
        consolidated,
        inventory,
        feedback,
        transactions,
        metrics,
        duration: start.elapsed(),
    };
    tracing::info!("{}", output.summary());
    Ok(output)
}
