//! Generate config command implementation

use crate::config::CliConfig;
use crate::error::CliError;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

const HEADER: &str = "\
# piiscope configuration
#
# Every key is optional. Listed priorities and thresholds override the
# built-in value for that type only; unlisted types keep their defaults.
# Type names: email, phone, money, quantity, url, ipAddress, ssn,
# creditCard, date, address, location, properNoun.

";

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        if self.output.exists() && !self.force {
            return Err(CliError::ConfigError(format!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            ))
            .into());
        }

        let template = Self::generate_template()?;
        std::fs::write(&self.output, template)
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("Configuration written to {}", self.output.display());
        println!();
        println!("Use it with:");
        println!("   piiscope scan -i input.txt -c {}", self.output.display());

        Ok(())
    }

    /// Default configuration rendered as commented TOML
    fn generate_template() -> Result<String> {
        let body = CliConfig::default().to_toml_string()?;
        Ok(format!("{HEADER}{body}"))
    }
}
