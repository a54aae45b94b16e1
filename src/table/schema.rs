//! Schema resolution for extracts whose headers drift between exports.
//!
//! A processor asks for a canonical column; resolution either finds it, finds
//! a stand-in by alias or substring and renames it, or reports it missing so
//! the processor can create an empty column. Every non-exact outcome becomes a
//! [`SchemaDrift`] entry in the dataset's metrics.

use super::frame::{column_names, has_column};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// How a missing canonical column may be matched.
#[derive(Debug, Clone, Copy)]
pub enum ColumnMatcher<'a> {
    /// Only the canonical name is accepted
    Exact,
    /// Any of these exact headers stands in for the canonical one
    Aliases(&'a [String]),
    /// First header whose lowercased name contains any of these needles
    Substrings(&'a [&'a str]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnResolution {
    Exact,
    Renamed { from: String },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaDrift {
    /// An alternate header was renamed to the canonical one
    Renamed { expected: String, found: String },
    /// No usable header; an empty column was created
    Missing { expected: String },
}

impl ColumnResolution {
    pub fn drift(&self, canonical: &str) -> Option<SchemaDrift> {
        match self {
            Self::Exact => None,
            Self::Renamed { from } => Some(SchemaDrift::Renamed {
                expected: canonical.to_owned(),
                found: from.clone(),
            }),
            Self::Missing => Some(SchemaDrift::Missing {
                expected: canonical.to_owned(),
            }),
        }
    }
}

pub fn resolve_column(
    df: &DataFrame,
    canonical: &str,
    matcher: ColumnMatcher<'_>,
) -> ColumnResolution {
    if has_column(df, canonical) {
        return ColumnResolution::Exact;
    }
    let names = column_names(df);
    let found = match matcher {
        ColumnMatcher::Exact => None,
        ColumnMatcher::Aliases(aliases) => aliases
            .iter()
            .find(|alias| names.iter().any(|n| n == *alias))
            .cloned(),
        ColumnMatcher::Substrings(needles) => names
            .into_iter()
            .find(|n| {
                let lower = n.to_lowercase();
                needles.iter().any(|needle| lower.contains(needle))
            }),
    };
    found.map_or(ColumnResolution::Missing, |from| ColumnResolution::Renamed {
        from,
    })
}

/// Resolve `canonical` and rename the stand-in if one was found. A missing
/// column is left missing; see [`ensure_columns`].
///
/// # Errors
///
/// Fails only if polars rejects the rename.
pub fn standardize_column(
    df: &mut DataFrame,
    canonical: &str,
    matcher: ColumnMatcher<'_>,
    drift: &mut Vec<SchemaDrift>,
) -> Result<ColumnResolution> {
    let resolution = resolve_column(df, canonical, matcher);
    if let ColumnResolution::Renamed { from } = &resolution {
        tracing::warn!("Column '{from}' stands in for '{canonical}'");
        df.rename(from, canonical.into())?;
        drift.extend(resolution.drift(canonical));
    }
    Ok(resolution)
}

/// Create an all-missing text column for each expected header that is absent.
///
/// # Errors
///
/// Fails only if polars rejects the new column.
pub fn ensure_columns(
    df: &mut DataFrame,
    expected: &[&str],
    drift: &mut Vec<SchemaDrift>,
) -> Result<()> {
    for name in expected {
        if has_column(df, name) {
            continue;
        }
        tracing::warn!("Expected column '{name}' is absent; filling with missing values");
        df.with_column(Column::full_null(
            (*name).into(),
            df.height(),
            &DataType::String,
        ))?;
        drift.extend(ColumnResolution::Missing.drift(name));
    }
    Ok(())
}
