//! Document loading error types.

use std::path::PathBuf;

use crate::domain::SchemaError;

/// Errors from reading, parsing or converting a scheduling document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Reading or writing the file failed
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON, or not shaped like a document
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but cannot be turned into a dataset
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}
