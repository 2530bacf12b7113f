//! File reading utilities

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File reader with UTF-8 validation
///
/// Non-UTF-8 input is rejected rather than decoded lossily, so reported
/// byte offsets always match the file on disk.
pub struct FileReader;

/// One input file loaded into memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    /// Path as shown in reports
    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }
}

impl FileReader {
    /// Read a file as UTF-8 text
    pub fn read_text(path: &Path) -> Result<String> {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

        String::from_utf8(bytes)
            .with_context(|| format!("File is not valid UTF-8: {}", path.display()))
    }

    /// Read a file into a [`SourceFile`]
    pub fn load(path: &Path) -> Result<SourceFile> {
        let text = Self::read_text(path)?;
        log::debug!("read {} bytes from {}", text.len(), path.display());
        Ok(SourceFile {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Get file size in bytes
    pub fn file_size(path: &Path) -> Result<u64> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;

        Ok(metadata.len())
    }
}
