use std::path::Path;

use thiserror::Error;

use crate::domain::ExecutionHistory;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write the history document as pretty-printed JSON (2-space indent).
/// One-shot overwrite of whatever is at `path`; no temp-file-then-rename.
pub fn write_history(path: &Path, history: &ExecutionHistory) -> Result<(), OutputError> {
    let document = serde_json::to_string_pretty(history)?;
    std::fs::write(path, document).map_err(|source| OutputError::Write {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!(path = %path.display(), "wrote execution history");
    Ok(())
}
