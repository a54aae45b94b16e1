//! Centralized error handling for the cleaning pipeline.
//!
//! Only one failure is meaningful to callers of the pipeline: a source extract
//! that cannot be read ([`PipelineError::SourceRead`]). Every other data defect
//! (missing columns, unparseable cells, degenerate statistics) is repaired
//! inside the component that finds it and counted in that dataset's metrics.
//!
//! The remaining variants exist for the plumbing around the core: the table
//! engine, writing exports, and loading rule files.
//!
//! ```
//! use techlogistics::error::PipelineError;
//!
//! fn describe(err: &PipelineError) -> String {
//!     match err {
//!         PipelineError::SourceRead { dataset, .. } => format!("cannot read {dataset}"),
//!         other => other.to_string(),
//!     }
//! }
//! ```

use std::fmt;

/// Main error type for pipeline operations.
#[derive(Debug)]
pub enum PipelineError {
    /// A source extract is missing or corrupt. Fatal for the whole run.
    SourceRead { dataset: String, message: String },

    /// I/O errors while writing outputs
    Io(std::io::Error),

    /// Table engine failures (Polars)
    DataProcessing(String),

    /// Rule file could not be read or parsed
    Config(String),

    /// Generic error with context
    Other(String),
}

impl PipelineError {
    pub fn source_read(dataset: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::SourceRead {
            dataset: dataset.into(),
            message: err.to_string(),
        }
    }

    /// True for the failure class that must abort a run.
    pub fn is_source_failure(&self) -> bool {
        matches!(self, Self::SourceRead { .. })
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceRead { dataset, message } => {
                write!(f, "Failed to read source '{dataset}': {message}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: PipelineError = e.into();
            PipelineError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: PipelineError = e.into();
            PipelineError::Other(format!("{}: {}", f(), err))
        })
    }
}
