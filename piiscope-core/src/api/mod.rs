//! Public detection API
//!
//! This module provides the entry points hosts use: a [`PiiDetector`]
//! configured once and shared across scans, plus the [`Config`], [`Input`]
//! and [`Output`] types around it.

mod config;
mod detector;
mod error;
mod input;
mod output;


pub use crate::domain::{EnabledTypes, EntityStats};
pub use config::{Config, ConfigBuilder};
pub use detector::PiiDetector;
pub use error::{Error, Result};
pub use input::Input;
pub use output::{Output, ProcessingMetadata};
