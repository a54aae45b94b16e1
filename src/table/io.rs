use anyhow::{Context as _, Result};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Cell contents read as missing, matching what spreadsheet exports and
/// pandas-based tooling upstream treat as NA. Empty fields are always missing.
pub const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Every column is read as text; typing happens in the processors so a bad
/// cell never fails the whole read.
fn raw_read_options() -> CsvReadOptions {
    let null_values = NA_TOKENS.iter().map(|s| (*s).into()).collect();
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default().with_null_values(Some(NullValues::AllColumns(null_values))),
        )
}

/// Read a delimited extract as a raw, all-text table.
///
/// # Errors
///
/// Fails when the file is missing, empty, or not parseable as CSV.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    raw_read_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read an in-memory extract as a raw, all-text table.
///
/// # Errors
///
/// Fails when the bytes are not parseable as CSV.
pub fn load_table_from_bytes(bytes: impl Into<Vec<u8>>) -> Result<DataFrame> {
    raw_read_options()
        .into_reader_with_file_handle(Cursor::new(bytes.into()))
        .finish()
        .context("Failed to parse CSV content")
}

/// Write a table as CSV with a header row.
///
/// # Errors
///
/// Fails when the file cannot be created or written.
pub fn save_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(df)
        .context("Failed to write CSV file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_raw_read_keeps_text_and_marks_na() -> Result<()> {
        let df = load_table_from_bytes("id,qty,note\n1,-5,nan\n2,abc,\n3,7,ok\n")?;
        assert_eq!(df.height(), 3);
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }
        assert_eq!(df.column("note")?.null_count(), 2);
        let qty = df.column("qty")?.as_materialized_series().clone();
        assert_eq!(qty.str()?.get(1).unwrap(), "abc");
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_table(Path::new("testdata/does_not_exist.csv"));
        assert!(result.is_err());
    }
}
