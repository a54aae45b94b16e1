//! Run orchestration over the three extracts.
//!
//! A run reads the inventory, feedback and transaction extracts, cleans each
//! one leaf-first, and joins them into one consolidated table with quality
//! metrics per dataset. The consolidated table can then be narrowed to a
//! segment, summarized, and exported.
//!
//! # Example
//!
//! ```no_run
//! use techlogistics::config::CleaningRules;
//! use techlogistics::pipeline::{ExecutiveSummary, SourcePaths, run_pipeline};
//!
//! let rules = CleaningRules::default();
//! let output = run_pipeline(&SourcePaths::in_dir("data"), &rules)?;
//! let summary = ExecutiveSummary::from_table(&output.consolidated, &rules)?;
//! println!("{summary}");
//! # Ok::<(), techlogistics::error::PipelineError>(())
//! ```

pub mod export;
pub mod runner;
pub mod segment;
pub mod summary;

pub use export::{ExportedFiles, consolidated_file_name, export_run, write_metrics};
pub use runner::{PipelineOutput, SourcePaths, run_from_tables, run_pipeline};
pub use segment::{SegmentFilter, filter_segment};
pub use summary::{CategoryRevenue, ExecutiveSummary};
