//! Sources a scan can read from

use crate::api::Error;
use crate::domain::{ContainerFilter, LeafDocument, Segmenter, TextMap};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

const UTF8_BOM: char = '\u{feff}';

/// Where the text to scan comes from
pub enum Input {
    /// Text already in memory
    Text(String),
    /// A UTF-8 file on disk
    File(PathBuf),
    /// Raw UTF-8 bytes
    Bytes(Vec<u8>),
    /// Anything readable to the end
    Reader(Box<dyn Read + Send + Sync>),
    /// A segmented document; script, style and similar leaves are skipped
    Document(LeafDocument),
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Text(text) => write!(f, "Input::Text({} bytes)", text.len()),
            Input::File(path) => write!(f, "Input::File({})", path.display()),
            Input::Bytes(bytes) => write!(f, "Input::Bytes({} bytes)", bytes.len()),
            Input::Reader(_) => f.write_str("Input::Reader"),
            Input::Document(_) => f.write_str("Input::Document"),
        }
    }
}

impl Input {
    pub fn from_text(text: impl Into<String>) -> Self {
        Input::Text(text.into())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Input::File(path.as_ref().to_path_buf())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Input::Bytes(bytes)
    }

    pub fn from_reader(reader: impl Read + Send + Sync + 'static) -> Self {
        Input::Reader(Box::new(reader))
    }

    pub fn from_document(document: LeafDocument) -> Self {
        Input::Document(document)
    }

    /// Build the buffer to scan
    pub(crate) fn into_map(self) -> Result<TextMap, Error> {
        match self {
            Input::Document(document) => Ok(Segmenter::segment(&document, &ContainerFilter::new())),
            other => other.into_text().map(|text| TextMap::from_text(&text)),
        }
    }

    /// The input as text; decoded bytes lose a leading byte-order mark.
    ///
    /// A document yields its content leaves joined the way the segmenter joins them.
    pub(crate) fn into_text(self) -> Result<String, Error> {
        match self {
            Input::Text(text) => Ok(text),
            Input::Bytes(bytes) => decode(bytes),
            Input::File(path) => {
                let bytes = std::fs::read(&path).map_err(|e| {
                    Error::Infrastructure(format!("Failed to read file {}: {}", path.display(), e))
                })?;
                decode(bytes)
            }
            Input::Reader(mut reader) => {
                let mut bytes = Vec::new();
                reader
                    .read_to_end(&mut bytes)
                    .map_err(|e| Error::Infrastructure(format!("Failed to read input: {}", e)))?;
                decode(bytes)
            }
            Input::Document(document) => Ok(Segmenter::segment(&document, &ContainerFilter::new())
                .full_text()
                .to_string()),
        }
    }
}

fn decode(bytes: Vec<u8>) -> Result<String, Error> {
    let mut text = String::from_utf8(bytes).map_err(|e| {
        Error::InvalidInput(format!(
            "not valid UTF-8 after byte {}",
            e.utf8_error().valid_up_to()
        ))
    })?;
    if text.starts_with(UTF8_BOM) {
        text.drain(..UTF8_BOM.len_utf8());
    }
    Ok(text)
}

impl From<LeafDocument> for Input {
    fn from(document: LeafDocument) -> Self {
        Input::Document(document)
    }
}
