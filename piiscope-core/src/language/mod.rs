//! Word lists and gazetteers backing the detectors
//!
//! Everything here is read-only after first load and safe to share across
//! concurrent scans.

pub mod common_words;
pub mod config;
pub mod loader;
pub mod tables;

pub use common_words::{embedded_common_words, CommonWordLookup, SharedWordList, WordList};
pub use config::{DepartmentConfig, LexiconConfig};
pub use loader::english_lexicon;
pub use tables::{Lexicon, LocationTable, WordTable};
