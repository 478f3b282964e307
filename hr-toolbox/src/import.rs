// Plain-text name import.

use std::path::{Path, PathBuf};

use thiserror::Error;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8 text")]
    NotUtf8 { path: PathBuf },
}

/// Read a `.txt` or `.csv` file of names and return its text.
///
/// A leading byte-order mark is removed. The content is otherwise returned
/// as-is; splitting into names is the roster's job.
pub fn read_names_file(path: &Path) -> Result<String, ImportError> {
    let bytes = std::fs::read(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| ImportError::NotUtf8 {
        path: path.to_path_buf(),
    })?;
    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
