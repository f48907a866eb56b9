//! Pipeline error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort a run.
///
/// Problems with individual calendar entries are never errors; they are
/// reported as [`SkipReason`](crate::builder::SkipReason)s instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The dedup reference document exists but could not be read.
    #[error("failed to read dedup reference {}: {source}", path.display())]
    DedupRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON rendering failed.
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}
