//! Joins the cleaned tables into one fact table with financial and logistics
//! metrics.
//!
//! One output row per transaction: both joins are left joins against a
//! right side reduced to its first row per key.

use crate::columns::{
    CATEGORY, COST, CURRENT_STOCK, DELIVERY_GAP, FEEDBACK_JOIN_FIELDS, FINAL_PRICE,
    INVENTORY_JOIN_FIELDS, LEAD_TIME_DAYS, LOYALTY_PARADOX_FLAG, MARGIN, NO_INVENTORY_FLAG,
    NPS_NORMALIZED, QUANTITY, REVENUE, SHIPPING_COST, SKU_ID, SUPPORT_TICKET_FLAG, TRANSACTION_ID,
    UNIT_COST,
};
use crate::config::CleaningRules;
use crate::error::Result;
use crate::table::frame::{
    gather, has_column, numeric_values, set_bool, set_f64, set_i32, set_str, string_values,
};
use crate::table::schema::{ColumnResolution, standardize_column};
use crate::table::stats::quantile;
use crate::table::ColumnMatcher;
use polars::prelude::*;
use std::collections::HashMap;

/// Row of `right` matching each row of `left` on `key`, first match wins.
fn lookup_positions(
    left: &DataFrame,
    right: &DataFrame,
    key: &str,
) -> Result<Vec<Option<IdxSize>>> {
    if !has_column(left, key) || !has_column(right, key) {
        tracing::warn!("Join key '{key}' missing on one side; no rows will match");
        return Ok(vec![None; left.height()]);
    }
    let mut index: HashMap<String, IdxSize> = HashMap::new();
    for (row, value) in string_values(right, key)?.into_iter().enumerate() {
        if let Some(value) = value {
            index.entry(value).or_insert(row as IdxSize);
        }
    }
    Ok(string_values(left, key)?
        .iter()
        .map(|k| k.as_ref().and_then(|k| index.get(k).copied()))
        .collect())
}

/// Bring `fields` from `right` into `df` by position. Fields absent on the
/// right become all-missing columns; existing columns are overwritten.
fn left_join_fields(
    df: &mut DataFrame,
    right: &DataFrame,
    positions: &[Option<IdxSize>],
    fields: &[&str],
) -> Result<()> {
    for field in fields {
        if has_column(right, field) {
            let series = gather(right.column(field)?, positions)?;
            df.with_column(series)?;
        } else {
            tracing::debug!("Join field '{field}' not present; filling with missing values");
            df.with_column(Column::full_null(
                (*field).into(),
                df.height(),
                &DataType::String,
            ))?;
        }
    }
    Ok(())
}

fn ensure_delivery_column(df: &mut DataFrame, canonical: &str) -> Result<()> {
    let mut drift = Vec::new();
    let resolution = standardize_column(
        df,
        canonical,
        ColumnMatcher::Substrings(&["tiempo", "entrega"]),
        &mut drift,
    )?;
    if resolution == ColumnResolution::Missing {
        tracing::warn!("No delivery-time column; assuming zero days");
        set_f64(df, canonical, vec![Some(0.0); df.height()])?;
    }
    Ok(())
}

fn product(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? * b?)
}

/// Build the consolidated fact table from the cleaned transactions,
/// inventory and feedback.
///
/// # Errors
///
/// Fails only on internal table-engine errors.
pub fn consolidate(
    transactions: &DataFrame,
    inventory: &DataFrame,
    feedback: &DataFrame,
    rules: &CleaningRules,
) -> Result<DataFrame> {
    tracing::info!(
        "Consolidating {} transactions with {} inventory and {} feedback rows",
        transactions.height(),
        inventory.height(),
        feedback.height()
    );
    let mut df = transactions.clone();
    let delivery_column = rules.delivery_column().to_owned();
    ensure_delivery_column(&mut df, &delivery_column)?;

    let inventory_rows = lookup_positions(&df, inventory, SKU_ID)?;
    left_join_fields(&mut df, inventory, &inventory_rows, &INVENTORY_JOIN_FIELDS)?;

    let feedback_rows = lookup_positions(&df, feedback, TRANSACTION_ID)?;
    let present_fields: Vec<&str> = FEEDBACK_JOIN_FIELDS
        .iter()
        .copied()
        .filter(|f| has_column(feedback, f))
        .collect();
    left_join_fields(&mut df, feedback, &feedback_rows, &present_fields)?;

    let mut no_inventory = Vec::with_capacity(df.height());
    let categories: Vec<Option<String>> = string_values(&df, CATEGORY)?
        .into_iter()
        .map(|c| {
            no_inventory.push(c.is_none());
            Some(c.unwrap_or_else(|| rules.uncatalogued_label.clone()))
        })
        .collect();
    let invisible = no_inventory.iter().filter(|f| **f).count();
    if invisible > 0 {
        tracing::warn!("{invisible} sales have no inventory record");
    }

    let nps: Vec<Option<f64>> = if has_column(&df, NPS_NORMALIZED) {
        numeric_values(&df, NPS_NORMALIZED)?
    } else {
        vec![None; df.height()]
    }
    .into_iter()
    .map(|n| Some(n.unwrap_or(rules.default_nps)))
    .collect();

    let tickets: Vec<i32> = if has_column(&df, SUPPORT_TICKET_FLAG) {
        numeric_values(&df, SUPPORT_TICKET_FLAG)?
    } else {
        vec![None; df.height()]
    }
    .into_iter()
    .map(|t| t.map_or(0, |t| t as i32))
    .collect();

    let stock: Vec<Option<f64>> = numeric_values(&df, CURRENT_STOCK)?
        .into_iter()
        .map(|s| Some(s.unwrap_or(0.0)))
        .collect();
    let delivery: Vec<f64> = numeric_values(&df, &delivery_column)?
        .into_iter()
        .map(|d| d.unwrap_or(0.0))
        .collect();

    let prices = numeric_values(&df, FINAL_PRICE)?;
    let quantities = numeric_values(&df, QUANTITY)?;
    let shipping = numeric_values(&df, SHIPPING_COST)?;
    let unit_costs = numeric_values(&df, UNIT_COST)?;
    let lead_times = numeric_values(&df, LEAD_TIME_DAYS)?;

    let mut revenue = Vec::with_capacity(df.height());
    let mut cost = Vec::with_capacity(df.height());
    let mut margin = Vec::with_capacity(df.height());
    let rows = prices
        .iter()
        .zip(&quantities)
        .zip(&shipping)
        .zip(&unit_costs);
    for (((price, quantity), shipping), unit_cost) in rows {
        let r = product(*price, *quantity);
        let c = product(Some(unit_cost.unwrap_or(0.0)), *quantity)
            .and_then(|goods| Some(goods + (*shipping)?));
        revenue.push(r);
        cost.push(c);
        margin.push(r.zip(c).map(|(r, c)| r - c));
    }
    let delivery_gap: Vec<Option<f64>> = delivery
        .iter()
        .zip(&lead_times)
        .map(|(d, l)| Some(d - l.unwrap_or(0.0)))
        .collect();

    set_str(&mut df, CATEGORY, categories)?;
    set_bool(&mut df, NO_INVENTORY_FLAG, no_inventory)?;
    set_f64(&mut df, NPS_NORMALIZED, nps)?;
    set_f64(&mut df, CURRENT_STOCK, stock)?;
    set_f64(&mut df, &delivery_column, delivery.into_iter().map(Some).collect())?;
    set_i32(&mut df, SUPPORT_TICKET_FLAG, tickets)?;
    set_f64(&mut df, REVENUE, revenue)?;
    set_f64(&mut df, COST, cost)?;
    set_f64(&mut df, MARGIN, margin)?;
    set_f64(&mut df, DELIVERY_GAP, delivery_gap)?;

    apply_loyalty_paradox(df, rules)
}

/// Flag rows whose stock sits above the configured quantile of the table's
/// stock while NPS stays below the loyalty threshold.
///
/// The quantile is taken over the rows passed in, so a filtered segment gets
/// its own threshold.
///
/// # Errors
///
/// Fails only on internal table-engine errors.
pub fn apply_loyalty_paradox(mut df: DataFrame, rules: &CleaningRules) -> Result<DataFrame> {
    let height = df.height();
    let stock: Vec<f64> = if has_column(&df, CURRENT_STOCK) {
        numeric_values(&df, CURRENT_STOCK)?
            .into_iter()
            .map(|s| s.unwrap_or(0.0))
            .collect()
    } else {
        vec![0.0; height]
    };
    let nps: Vec<f64> = if has_column(&df, NPS_NORMALIZED) {
        numeric_values(&df, NPS_NORMALIZED)?
            .into_iter()
            .map(|n| n.unwrap_or(rules.default_nps))
            .collect()
    } else {
        vec![rules.default_nps; height]
    };

    let threshold = quantile(&stock, rules.loyalty_stock_quantile).unwrap_or(0.0);
    let flags: Vec<bool> = stock
        .iter()
        .zip(&nps)
        .map(|(s, n)| *s > threshold && *n < rules.loyalty_nps_threshold)
        .collect();
    tracing::debug!(
        "Loyalty paradox: stock threshold {threshold:.2}, {} rows flagged",
        flags.iter().filter(|f| **f).count()
    );
    set_bool(&mut df, LOYALTY_PARADOX_FLAG, flags)?;
    Ok(df)
}
