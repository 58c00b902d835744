//! Reading and writing scheduling documents.

use std::path::Path;

use tracing::debug;

use super::{Document, LoadError};
use crate::domain::Dataset;

/// Parse a document from a JSON string.
pub fn parse_document(json: &str) -> Result<Document, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a document from a JSON file.
pub async fn load_document(path: impl AsRef<Path>) -> Result<Document, LoadError> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let document = parse_document(&json)?;
    debug!(
        path = %path.display(),
        stops = document.stops.as_ref().map_or(0, Vec::len),
        trips = document.trips.as_ref().map_or(0, Vec::len),
        vehicles = document.vehicles.as_ref().map_or(0, Vec::len),
        duties = document.duties.as_ref().map_or(0, Vec::len),
        "Loaded document"
    );
    Ok(document)
}

/// Read a document and convert it into a dataset.
pub async fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let document = load_document(path).await?;
    Ok(Dataset::from_document(&document)?)
}

/// Write a document as pretty-printed JSON.
pub async fn write_document(path: impl AsRef<Path>, document: &Document) -> Result<(), LoadError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(document)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}
