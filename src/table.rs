//! Tabular plumbing shared by the processors: reading and writing extracts,
//! typed column access, header resolution, and order statistics.

pub mod frame;
pub mod io;
pub mod naming;
pub mod schema;
pub mod stats;

pub use io::{load_table, load_table_from_bytes, save_table};
pub use schema::{ColumnMatcher, ColumnResolution, SchemaDrift};
