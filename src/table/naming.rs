use crate::error::Result;
use polars::prelude::DataFrame;
use std::collections::HashSet;

/// Trim surrounding whitespace from each header. Two headers that collapse to
/// the same name keep the first as-is and suffix later ones with `_1`, `_2`, ...
pub fn trimmed_column_names(names: &[String]) -> Vec<String> {
    let mut cleaned_names = Vec::with_capacity(names.len());
    let mut seen = HashSet::new();

    for name in names {
        let base = name.trim().to_owned();
        let mut clean = base.clone();
        let mut count = 0;

        while seen.contains(&clean) {
            count += 1;
            clean = format!("{base}_{count}");
        }

        seen.insert(clean.clone());
        cleaned_names.push(clean);
    }
    cleaned_names
}

/// Trim the headers of `df` in place.
///
/// # Errors
///
/// Fails only if polars rejects the new header set.
pub fn trim_column_names(df: &mut DataFrame) -> Result<()> {
    let names = super::frame::column_names(df);
    let trimmed = trimmed_column_names(&names);
    if trimmed != names {
        df.set_column_names(trimmed.iter().map(String::as_str))?;
    }
    Ok(())
}
