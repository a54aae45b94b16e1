//! Column accessors between polars tables and the plain vectors the
//! processors compute on.
//!
//! Readers never fail on cell contents: text that does not parse becomes
//! `None` and the caller decides which default applies and counts it.

use crate::error::Result;
use chrono::{Datelike as _, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// `num_days_from_ce` of 1970-01-01, the polars `Date` epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
];

// Month-first before day-first for ambiguous slash dates.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y%m%d",
];

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|n| n.as_str() == name)
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|n| n.as_str().to_owned())
        .collect()
}

/// Lenient number parsing: surrounding whitespace is ignored, NaN is missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Permissive date parsing across the formats the extracts use.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(trimmed, f).ok())
        })
}

/// Values of a column rendered as text.
///
/// # Errors
///
/// Fails if the column does not exist.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let ca = series.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_owned)).collect())
}

/// Values of a column as numbers; unparseable text becomes `None`.
///
/// # Errors
///
/// Fails if the column does not exist.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?;
    if column.dtype().is_primitive_numeric() {
        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        return Ok(series.f64()?.into_iter().collect());
    }
    Ok(string_values(df, name)?
        .iter()
        .map(|v| v.as_deref().and_then(parse_number))
        .collect())
}

/// Values of a flag column. Text columns accept `true`/`false` and `1`/`0`.
///
/// # Errors
///
/// Fails if the column does not exist.
pub fn bool_values(df: &DataFrame, name: &str) -> Result<Vec<Option<bool>>> {
    let column = df.column(name)?;
    if column.dtype() == &DataType::Boolean {
        return Ok(column.as_materialized_series().bool()?.into_iter().collect());
    }
    Ok(string_values(df, name)?
        .iter()
        .map(|v| match v.as_deref().map(str::trim) {
            Some("true" | "True" | "TRUE" | "1") => Some(true),
            Some("false" | "False" | "FALSE" | "0") => Some(false),
            _ => None,
        })
        .collect())
}

pub fn set_f64(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

pub fn set_str(df: &mut DataFrame, name: &str, values: Vec<Option<String>>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

pub fn set_i64(df: &mut DataFrame, name: &str, values: Vec<i64>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

pub fn set_i32(df: &mut DataFrame, name: &str, values: Vec<i32>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

pub fn set_bool(df: &mut DataFrame, name: &str, values: Vec<bool>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

pub fn set_date(df: &mut DataFrame, name: &str, values: &[Option<NaiveDate>]) -> Result<()> {
    let days: Vec<Option<i32>> = values
        .iter()
        .map(|d| d.map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
        .collect();
    let series = Series::new(name.into(), days).cast(&DataType::Date)?;
    df.with_column(series)?;
    Ok(())
}

/// Gather rows of `column` by position; `None` positions yield missing cells.
///
/// # Errors
///
/// Fails if an index is out of bounds.
pub fn gather(column: &Column, positions: &[Option<IdxSize>]) -> Result<Series> {
    let idx = IdxCa::from_iter_options("idx".into(), positions.iter().copied());
    Ok(column.as_materialized_series().take(&idx)?)
}

/// One key per row over the given columns; missing cells get a marker that no
/// text value can produce.
///
/// # Errors
///
/// Fails if a column does not exist.
pub fn row_keys(df: &DataFrame, columns: &[String]) -> Result<Vec<String>> {
    let mut keys = vec![String::new(); df.height()];
    for name in columns {
        let values = string_values(df, name)?;
        for (key, value) in keys.iter_mut().zip(values) {
            match value {
                Some(v) => key.push_str(&v),
                None => key.push('\u{0}'),
            }
            key.push('\u{1f}');
        }
    }
    Ok(keys)
}
