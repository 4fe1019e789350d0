//! Artifact persistence.
//!
//! Regeneration overwrites in place: [`ensure_file_at`] makes the file (and its
//! parent directories) exist, [`write_artifact`] truncates and writes it.

use std::fs;
use std::path::Path;

use crate::error::OutputError;

/// Creates `path` and any missing parent directories. An existing file is
/// left untouched.
pub fn ensure_file_at(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| OutputError::CreateDir {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| OutputError::Write {
            path: path.display().to_string(),
            source: e,
        })?;

    Ok(())
}

/// Replaces the contents of `path` with `content`.
pub fn write_artifact(path: &Path, content: &str) -> Result<(), OutputError> {
    ensure_file_at(path)?;

    fs::write(path, content).map_err(|e| OutputError::Write {
        path: path.display().to_string(),
        source: e,
    })?;

    tracing::info!(path = %path.display(), bytes = content.len(), "wrote artifact");
    Ok(())
}
