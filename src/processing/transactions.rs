//! Transaction log cleaning and cross-checks against the cleaned inventory
//! and feedback tables.
//!
//! Only sentinel delivery times are removed here. Margins and shipment status
//! belong to the consolidated table, where inventory costs are available.

use super::health::health_score;
use super::metrics::{Dataset, DatasetCounters, QualityMetrics, TransactionCounters};
use crate::columns::{
    DESTINATION_CITY, FINAL_PRICE, QUANTITY, SALE_DATE, SALES_CHANNEL, SHIPPING_COST, SKU_ID,
    TRANSACTION_COLUMNS, TRANSACTION_ID,
};
use crate::config::CleaningRules;
use crate::error::Result;
use crate::table::frame::{
    has_column, numeric_values, parse_date, parse_number, set_date, set_f64, set_str,
    string_values,
};
use crate::table::naming::trim_column_names;
use crate::table::schema::{ensure_columns, standardize_column};
use crate::table::ColumnMatcher;
use polars::prelude::*;
use std::collections::HashSet;

/// Distinct non-missing values of `column`, empty when the column is absent.
fn key_set(df: &DataFrame, column: &str) -> Result<HashSet<String>> {
    if !has_column(df, column) {
        tracing::warn!("Reference table has no '{column}' column; every key is unmatched");
        return Ok(HashSet::new());
    }
    Ok(string_values(df, column)?.into_iter().flatten().collect())
}

fn unmatched(keys: &[Option<String>], reference: &HashSet<String>) -> usize {
    keys.iter()
        .filter(|k| k.as_ref().is_none_or(|k| !reference.contains(k)))
        .count()
}

/// Unreadable amounts become zero; returns the values and how many were coerced.
fn coerce_amounts(raw: &[Option<String>]) -> (Vec<Option<f64>>, usize) {
    let mut coerced = 0;
    let values = raw
        .iter()
        .map(|v| {
            Some(v.as_deref().and_then(parse_number).unwrap_or_else(|| {
                coerced += 1;
                0.0
            }))
        })
        .collect();
    (values, coerced)
}

fn normalize_text(raw: Option<&str>, f: impl Fn(&str) -> String) -> Option<String> {
    let trimmed = raw?.trim();
    (!trimmed.is_empty()).then(|| f(trimmed))
}

struct DeliveryCleaning {
    times: Vec<Option<f64>>,
    sentinels: usize,
    negatives: usize,
}

fn clean_delivery_times(raw: Vec<Option<f64>>, threshold: f64) -> DeliveryCleaning {
    let mut sentinels = 0;
    let mut negatives = 0;
    let times = raw
        .into_iter()
        .map(|t| match t {
            Some(v) if v > threshold => {
                sentinels += 1;
                None
            }
            Some(v) if v < 0.0 => {
                negatives += 1;
                None
            }
            other => other,
        })
        .collect();
    DeliveryCleaning {
        times,
        sentinels,
        negatives,
    }
}

/// Clean the transaction log, validating SKUs against the cleaned inventory
/// and transaction ids against the cleaned feedback.
///
/// # Errors
///
/// Fails only on internal table-engine errors; malformed cells are repaired.
pub fn process_transactions(
    mut df: DataFrame,
    inventory: &DataFrame,
    feedback: &DataFrame,
    rules: &CleaningRules,
) -> Result<(DataFrame, QualityMetrics)> {
    tracing::info!("Cleaning transactions: {} rows", df.height());
    let mut drift = Vec::new();
    trim_column_names(&mut df)?;
    let delivery_column = rules.delivery_column().to_owned();
    standardize_column(
        &mut df,
        &delivery_column,
        ColumnMatcher::Aliases(&rules.delivery_time_aliases),
        &mut drift,
    )?;
    let before = health_score(&df);
    ensure_columns(&mut df, &TRANSACTION_COLUMNS, &mut drift)?;
    ensure_columns(&mut df, &[delivery_column.as_str()], &mut drift)?;

    let delivery = clean_delivery_times(
        numeric_values(&df, &delivery_column)?,
        rules.delivery_sentinel_threshold,
    );
    if delivery.sentinels > 0 {
        tracing::warn!(
            "{} delivery times above {} days treated as missing",
            delivery.sentinels,
            rules.delivery_sentinel_threshold
        );
    }

    let (prices, coerced_prices) = coerce_amounts(&string_values(&df, FINAL_PRICE)?);
    let (shipping, coerced_shipping_costs) = coerce_amounts(&string_values(&df, SHIPPING_COST)?);

    let (quantities, coerced_quantities) = coerce_amounts(&string_values(&df, QUANTITY)?);
    let mut negative_quantities = 0;
    let quantities: Vec<Option<f64>> = quantities
        .into_iter()
        .map(|q| {
            q.map(|q| {
                if q < 0.0 {
                    negative_quantities += 1;
                }
                q.abs()
            })
        })
        .collect();

    let cities: Vec<Option<String>> = string_values(&df, DESTINATION_CITY)?
        .iter()
        .map(|v| normalize_text(v.as_deref(), |c| rules.city(&c.to_uppercase())))
        .collect();
    let channels: Vec<Option<String>> = string_values(&df, SALES_CHANNEL)?
        .iter()
        .map(|v| normalize_text(v.as_deref(), str::to_lowercase))
        .collect();
    let sale_dates: Vec<_> = string_values(&df, SALE_DATE)?
        .iter()
        .map(|v| v.as_deref().and_then(parse_date))
        .collect();

    let unknown_skus = unmatched(&string_values(&df, SKU_ID)?, &key_set(inventory, SKU_ID)?);
    let without_feedback = unmatched(
        &string_values(&df, TRANSACTION_ID)?,
        &key_set(feedback, TRANSACTION_ID)?,
    );
    if unknown_skus > 0 {
        tracing::warn!("{unknown_skus} transactions reference SKUs missing from inventory");
    }

    set_f64(&mut df, &delivery_column, delivery.times)?;
    set_f64(&mut df, FINAL_PRICE, prices)?;
    set_f64(&mut df, SHIPPING_COST, shipping)?;
    set_f64(&mut df, QUANTITY, quantities)?;
    set_str(&mut df, DESTINATION_CITY, cities)?;
    set_str(&mut df, SALES_CHANNEL, channels)?;
    set_date(&mut df, SALE_DATE, &sale_dates)?;

    let after = health_score(&df);
    let counters = TransactionCounters {
        total: df.height(),
        delivery_outliers: delivery.sentinels,
        negative_delivery_times: delivery.negatives,
        coerced_prices,
        coerced_shipping_costs,
        coerced_quantities,
        negative_quantities,
        unknown_skus,
        without_feedback,
    };
    tracing::debug!("Transaction counters: {counters:?}");
    tracing::info!(
        "Transaction health {:.2} -> {:.2} ({} unknown SKUs, {} without feedback)",
        before.score,
        after.score,
        counters.unknown_skus,
        counters.without_feedback
    );

    let metrics = QualityMetrics::new(
        Dataset::Transactions,
        before,
        after,
        DatasetCounters::Transactions(counters),
        drift,
    );
    Ok((df, metrics))
}
