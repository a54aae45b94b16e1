//! Writing a run's tables and metrics to disk.

use super::runner::PipelineOutput;
use super::summary::ExecutiveSummary;
use crate::config::CleaningRules;
use crate::error::{Result, ResultExt as _};
use crate::processing::{Dataset, QualityMetrics};
use crate::table::save_table;
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const METRICS_FILE: &str = "metricas_calidad.json";
pub const SUMMARY_FILE: &str = "resumen_ejecutivo.json";

/// Dated name for the consolidated table, e.g.
/// `techlogistics_consolidado_20240315.csv`.
pub fn consolidated_file_name(date: NaiveDate) -> String {
    format!("techlogistics_consolidado_{}.csv", date.format("%Y%m%d"))
}

fn cleaned_file_name(dataset: Dataset) -> String {
    format!("{}_limpio.csv", dataset.key())
}

#[derive(Debug, Clone)]
pub struct ExportedFiles {
    pub consolidated: PathBuf,
    pub cleaned: Vec<PathBuf>,
    pub metrics: PathBuf,
    pub summary: PathBuf,
}

/// Serialize the per-dataset metrics as pretty JSON.
///
/// # Errors
///
/// Fails when the file cannot be written.
pub fn write_metrics(metrics: &BTreeMap<Dataset, QualityMetrics>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(metrics)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the consolidated table, the three cleaned tables, the metrics and
/// the executive summary into `dir`, creating it if needed.
///
/// # Errors
///
/// Fails when the directory or any file cannot be written.
pub fn export_run(
    output: &mut PipelineOutput,
    dir: &Path,
    rules: &CleaningRules,
) -> Result<ExportedFiles> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let consolidated = dir.join(consolidated_file_name(Local::now().date_naive()));
    save_table(&mut output.consolidated, &consolidated)
        .context("Failed to export consolidated table")?;

    let mut cleaned = Vec::with_capacity(3);
    for (dataset, table) in [
        (Dataset::Inventory, &mut output.inventory),
        (Dataset::Feedback, &mut output.feedback),
        (Dataset::Transactions, &mut output.transactions),
    ] {
        let path = dir.join(cleaned_file_name(dataset));
        save_table(table, &path).with_context(|| format!("Failed to export {dataset} table"))?;
        cleaned.push(path);
    }

    let metrics = dir.join(METRICS_FILE);
    write_metrics(&output.metrics, &metrics)?;

    let summary = dir.join(SUMMARY_FILE);
    let executive = ExecutiveSummary::from_table(&output.consolidated, rules)?;
    std::fs::write(&summary, serde_json::to_string_pretty(&executive)?)
        .with_context(|| format!("Failed to write {}", summary.display()))?;

    tracing::info!("Exported run to {}", dir.display());
    Ok(ExportedFiles {
        consolidated,
        cleaned,
        metrics,
        summary,
    })
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]
    use super::*;
    use crate::columns::{
        CATEGORY, CURRENT_STOCK, FINAL_PRICE, NPS_RAW, QUANTITY, SKU_ID, TRANSACTION_ID,
        UNIT_COST,
    };
    use crate::pipeline::runner::run_from_tables;
    use polars::prelude::*;

    fn frame(columns: &[(&str, &[&str])]) -> DataFrame {
        DataFrame::new(
            columns
                .iter()
                .map(|(name, values)| Column::new((*name).into(), values.to_vec()))
                .collect(),
        )
        .unwrap()
    }

    fn small_run() -> PipelineOutput {
        let inventory = frame(&[
            (SKU_ID, &["A", "B"]),
            (CATEGORY, &["laptop", "phone"]),
            (UNIT_COST, &["30", "10"]),
            (CURRENT_STOCK, &["40", "5"]),
        ]);
        let feedback = frame(&[(TRANSACTION_ID, &["T1"]), (NPS_RAW, &["9"])]);
        let transactions = frame(&[
            (TRANSACTION_ID, &["T1", "T2"]),
            (SKU_ID, &["A", "Z"]),
            (QUANTITY, &["2", "1"]),
            (FINAL_PRICE, &["100", "50"]),
        ]);
        run_from_tables(inventory, feedback, transactions, &CleaningRules::default()).unwrap()
    }

    #[test]
    fn test_consolidated_file_name_is_dated() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            consolidated_file_name(date),
            "techlogistics_consolidado_20240305.csv"
        );
    }

    #[test]
    fn test_export_run_writes_every_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("out");
        let mut output = small_run();
        let files = export_run(&mut output, &target, &CleaningRules::default())?;

        assert!(files.consolidated.exists());
        assert_eq!(files.cleaned.len(), 3);
        assert!(files.cleaned.iter().all(|p| p.exists()));
        assert!(target.join("inventario_limpio.csv").exists());

        let metrics: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files.metrics)?)?;
        for key in ["inventario", "transacciones", "feedback"] {
            assert!(metrics[key]["health_score_antes"].is_number(), "{key}");
            assert!(metrics[key]["health_score_despues"].is_number(), "{key}");
        }

        let summary: ExecutiveSummary =
            serde_json::from_str(&std::fs::read_to_string(&files.summary)?)?;
        assert_eq!(summary.records, 2);
        assert_eq!(summary.invisible_sales, 1);
        Ok(())
    }
}
