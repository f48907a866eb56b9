//! Suppression of items already present in a previous outline.
//!
//! The reference document is opaque: a candidate is considered tracked when
//! its link occurs anywhere in the text.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};

/// Checks candidate links against a previously generated document.
#[derive(Debug, Clone, Default)]
pub struct DedupFilter {
    reference: Option<String>,
}

impl DedupFilter {
    /// A filter that lets everything through.
    pub fn disabled() -> Self {
        Self { reference: None }
    }

    /// A filter over the given document text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            reference: Some(text.into()),
        }
    }

    /// Reads the reference document once.
    ///
    /// `None` disables the filter. A path that does not exist yet is treated
    /// as an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DedupRead`] if the file exists but cannot be
    /// read.
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        let Some(path) = path else {
            return Ok(Self::disabled());
        };

        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), bytes = text.len(), "Loaded dedup reference");
                Ok(Self::from_text(text))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "Dedup reference does not exist, nothing is tracked yet"
                );
                Ok(Self::from_text(String::new()))
            }
            Err(source) => Err(PipelineError::DedupRead {
                path: PathBuf::from(path),
                source,
            }),
        }
    }

    /// Returns `true` if the filter has a reference document.
    pub fn is_enabled(&self) -> bool {
        self.reference.is_some()
    }

    /// Returns `true` if `url` already occurs in the reference document.
    pub fn is_tracked(&self, url: &str) -> bool {
        self.reference
            .as_deref()
            .is_some_and(|text| text.contains(url))
    }
}
