//! File input adapter
//!
//! Reads a user-chosen file and declares its type from the extension, the
//! way a browser file picker does. Content is not sniffed.

use binsight_core::app_state::SelectedFile;
use binsight_core::payload::to_data_uri;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading a selected file
#[derive(Debug, Error)]
pub enum FileInputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Declared MIME type for a path, by extension
pub fn declared_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Reads `path` into a [`SelectedFile`]
///
/// Non-image files are read too; rejecting them is the state machine's job.
pub async fn read_selected_file(path: &Path) -> Result<SelectedFile, FileInputError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| FileInputError::Io {
            path: path.display().to_string(),
            source,
        })?;

    let declared_type = declared_type(path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!(
        name = %name,
        declared_type = %declared_type,
        size = bytes.len(),
        "Read selected file"
    );

    Ok(SelectedFile {
        data_uri: to_data_uri(&declared_type, &bytes),
        name,
        declared_type,
    })
}
