//! Inventory master cleaning.

use super::health::health_score;
use super::metrics::{CostRange, Dataset, DatasetCounters, InventoryCounters, QualityMetrics};
use crate::columns::{
    CATEGORY, CURRENT_STOCK, INVENTORY_COLUMNS, LAST_REVIEW_DATE, LEAD_TIME_DAYS, REORDER_POINT,
    SKU_ID, UNIT_COST, WAREHOUSE,
};
use crate::config::CleaningRules;
use crate::error::Result;
use crate::table::frame::{
    numeric_values, parse_date, parse_number, set_date, set_f64, set_str, string_values,
};
use crate::table::naming::trim_column_names;
use crate::table::schema::{ensure_columns, standardize_column};
use crate::table::stats::{group_medians, iqr_bounds, median, present};
use crate::table::ColumnMatcher;
use crate::utils::round2;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static EMBEDDED_INTEGER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+").ok());

/// Lead time in days from free text such as `"25-30 dias"` or `"Inmediato"`.
///
/// Missing tokens yield `None`; text containing the immediate token yields
/// the configured immediate days; otherwise the largest embedded integer.
pub fn parse_lead_time(raw: Option<&str>, rules: &CleaningRules) -> Option<f64> {
    let text = raw?.trim().to_lowercase();
    if rules.lead_time_missing_tokens.iter().any(|t| *t == text) {
        return None;
    }
    if text.contains(rules.lead_time_immediate_token.as_str()) {
        return Some(rules.lead_time_immediate_days);
    }
    EMBEDDED_INTEGER
        .as_ref()?
        .find_iter(&text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .reduce(f64::max)
}

/// Stock level as a non-negative number, plus whether the input was negative.
/// Unreadable stock counts as zero.
pub fn correct_stock(raw: Option<&str>) -> (f64, bool) {
    match raw.and_then(parse_number) {
        Some(v) if v < 0.0 => (v.abs(), true),
        Some(v) => (v, false),
        None => (0.0, false),
    }
}

fn normalize_warehouse(raw: Option<&str>, rules: &CleaningRules) -> Option<String> {
    let code = raw?.trim().to_uppercase();
    (!code.is_empty()).then(|| rules.warehouse(&code))
}

fn normalize_category(raw: Option<&str>, rules: &CleaningRules) -> Option<String> {
    rules.category(&raw?.trim().to_lowercase())
}

fn duplicate_keys(keys: &[Option<String>]) -> usize {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter().filter(|k| !seen.insert(k.as_deref())).count()
}

struct CostCleaning {
    costs: Vec<Option<f64>>,
    outliers: usize,
    imputed: usize,
}

/// IQR outliers take their category median (over the unreplaced costs).
/// Whatever is still unset afterwards, unreadable costs included, takes the
/// median of the costs resolved so far.
fn clean_costs(
    raw: Vec<Option<f64>>,
    categories: &[Option<String>],
    multiplier: f64,
) -> CostCleaning {
    let bounds = iqr_bounds(&present(&raw), multiplier);
    if let Some(b) = bounds {
        tracing::debug!(
            "Cost IQR bounds: q1={:.2} q3={:.2} lower={:.2} upper={:.2}",
            b.q1,
            b.q3,
            b.lower,
            b.upper
        );
    }
    let by_category = group_medians(categories, &raw);

    let mut outliers = 0;
    let missing = raw.iter().filter(|c| c.is_none()).count();
    let mut costs: Vec<Option<f64>> = raw
        .into_iter()
        .zip(categories)
        .map(|(cost, category)| match cost {
            Some(v) if bounds.is_some_and(|b| b.is_outlier(v)) => {
                outliers += 1;
                category.as_ref().and_then(|c| by_category.get(c).copied())
            }
            other => other,
        })
        .collect();

    let global = median(&present(&costs));
    let imputed = if global.is_some() { missing } else { 0 };
    for cost in costs.iter_mut().filter(|c| c.is_none()) {
        *cost = global;
    }

    CostCleaning {
        costs,
        outliers,
        imputed,
    }
}

/// Category median first, then the median of the lead times known after
/// that step.
fn impute_lead_times(lead_times: &mut [Option<f64>], categories: &[Option<String>]) -> usize {
    let by_category = group_medians(categories, lead_times);
    let missing = lead_times.iter().filter(|l| l.is_none()).count();
    for (lead_time, category) in lead_times.iter_mut().zip(categories) {
        if lead_time.is_none() {
            *lead_time = category.as_ref().and_then(|c| by_category.get(c).copied());
        }
    }

    let global = median(&present(lead_times));
    let mut unresolved = 0;
    for lead_time in lead_times.iter_mut().filter(|l| l.is_none()) {
        *lead_time = global;
        if global.is_none() {
            unresolved += 1;
        }
    }
    missing - unresolved
}

/// Clean the inventory master and report its quality metrics.
///
/// # Errors
///
/// Fails only on internal table-engine errors; malformed cells are repaired.
pub fn process_inventory(
    mut df: DataFrame,
    rules: &CleaningRules,
) -> Result<(DataFrame, QualityMetrics)> {
    tracing::info!("Cleaning inventory: {} rows", df.height());
    let mut drift = Vec::new();
    trim_column_names(&mut df)?;
    standardize_column(
        &mut df,
        WAREHOUSE,
        ColumnMatcher::Substrings(&["bodega"]),
        &mut drift,
    )?;
    let before = health_score(&df);
    ensure_columns(&mut df, &INVENTORY_COLUMNS, &mut drift)?;

    let duplicate_skus = duplicate_keys(&string_values(&df, SKU_ID)?);
    if duplicate_skus > 0 {
        tracing::warn!("{duplicate_skus} duplicated SKU_ID values in inventory");
    }

    let warehouses: Vec<Option<String>> = string_values(&df, WAREHOUSE)?
        .iter()
        .map(|v| normalize_warehouse(v.as_deref(), rules))
        .collect();

    let categories: Vec<Option<String>> = string_values(&df, CATEGORY)?
        .iter()
        .map(|v| normalize_category(v.as_deref(), rules))
        .collect();

    let mut lead_times: Vec<Option<f64>> = string_values(&df, LEAD_TIME_DAYS)?
        .iter()
        .map(|v| parse_lead_time(v.as_deref(), rules))
        .collect();

    let review_dates: Vec<_> = string_values(&df, LAST_REVIEW_DATE)?
        .iter()
        .map(|v| v.as_deref().and_then(parse_date))
        .collect();

    let mut negative_stock = 0;
    let stock: Vec<Option<f64>> = string_values(&df, CURRENT_STOCK)?
        .iter()
        .map(|v| {
            let (value, was_negative) = correct_stock(v.as_deref());
            if was_negative {
                negative_stock += 1;
            }
            Some(value)
        })
        .collect();

    let cleaned_costs = clean_costs(
        numeric_values(&df, UNIT_COST)?,
        &categories,
        rules.iqr_multiplier,
    );
    let imputed_lead_times = impute_lead_times(&mut lead_times, &categories);
    let reorder_points = numeric_values(&df, REORDER_POINT)?;

    let inventory_value: f64 = stock
        .iter()
        .zip(&cleaned_costs.costs)
        .filter_map(|(s, c)| Some((*s)? * (*c)?))
        .sum();
    let final_costs = present(&cleaned_costs.costs);
    let cost_range = final_costs
        .iter()
        .copied()
        .reduce(f64::min)
        .zip(final_costs.iter().copied().reduce(f64::max))
        .map(|(min, max)| CostRange { min, max });

    set_str(&mut df, WAREHOUSE, warehouses)?;
    set_str(&mut df, CATEGORY, categories)?;
    set_f64(&mut df, LEAD_TIME_DAYS, lead_times)?;
    set_date(&mut df, LAST_REVIEW_DATE, &review_dates)?;
    set_f64(&mut df, CURRENT_STOCK, stock)?;
    set_f64(&mut df, UNIT_COST, cleaned_costs.costs)?;
    set_f64(&mut df, REORDER_POINT, reorder_points)?;

    let after = health_score(&df);
    let counters = InventoryCounters {
        cost_outliers: cleaned_costs.outliers,
        negative_stock,
        imputed_costs: cleaned_costs.imputed,
        imputed_lead_times,
        duplicate_skus,
        inventory_value: round2(inventory_value),
        cost_range,
    };
    tracing::debug!("Inventory counters: {counters:?}");
    tracing::info!(
        "Inventory health {:.2} -> {:.2} ({} cost outliers, {} negative stock)",
        before.score,
        after.score,
        counters.cost_outliers,
        counters.negative_stock
    );

    let metrics = QualityMetrics::new(
        Dataset::Inventory,
        before,
        after,
        DatasetCounters::Inventory(counters),
        drift,
    );
    Ok((df, metrics))
}
