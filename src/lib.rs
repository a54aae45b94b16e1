//! # TechLogistics - Cleaning and Consolidation Core
//!
//! Three operational extracts arrive with defects: an inventory master, a
//! customer feedback survey, and a transaction log. This library cleans each
//! one, scores its data quality before and after, and joins them into one
//! consolidated fact table with derived financial and operational columns.
//!
//! ## Quick Start
//!
//! ```no_run
//! use techlogistics::config::CleaningRules;
//! use techlogistics::pipeline::{SourcePaths, run_pipeline};
//! use techlogistics::processing::Dataset;
//!
//! let output = run_pipeline(&SourcePaths::in_dir("data"), &CleaningRules::default())?;
//! println!("{} consolidated rows", output.consolidated.height());
//!
//! if let Some(metrics) = output.metrics_for(Dataset::Inventory) {
//!     println!("inventory health {} -> {}", metrics.score_before, metrics.score_after);
//! }
//! # Ok::<(), techlogistics::error::PipelineError>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`processing`]: Health scoring, the three dataset processors and the consolidator
//! - [`pipeline`]: End-to-end runs, segments, executive summary and export
//! - [`table`]: CSV I/O, typed column access, header resolution and statistics
//! - [`config`]: Cleaning rules (lookup tables and thresholds)
//! - [`columns`]: Canonical column names
//! - [`error`]: Error types and handling utilities
//! - [`logging`]: Console and rolling-file logging
//! - [`utils`]: Rounding and display formatting
//!
//! ## Failure Model
//!
//! An unreadable extract aborts the run with
//! [`error::PipelineError::SourceRead`]. Any other defect is repaired in
//! place and counted in the dataset's [`processing::QualityMetrics`].

#![warn(clippy::all, rust_2018_idioms)]

pub mod columns;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod processing;
pub mod table;
pub mod utils;
