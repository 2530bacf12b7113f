//! CLI command implementations

use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use piiscope_core::PiiType;

use crate::output::OutputFormat;

pub mod generate_config;
pub mod scan;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan text files for personally identifiable information
    Scan(scan::ScanArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },

    /// Write a configuration file with every default filled in
    GenerateConfig(generate_config::GenerateConfigArgs),
}

/// List subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ListCommands {
    /// List detectable PII types with their default priority and threshold
    Types,

    /// List available output formats
    Formats,
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Scan(args) => args.execute(),
            Commands::List { subcommand } => {
                print!("{}", subcommand.render());
                Ok(())
            }
            Commands::GenerateConfig(args) => args.execute(),
        }
    }
}

impl ListCommands {
    /// Listing text for this subcommand
    pub fn render(&self) -> String {
        let mut out = String::new();
        match self {
            ListCommands::Types => {
                out.push_str("Detectable types (name, priority, threshold):\n");
                for ty in PiiType::ALL {
                    out.push_str(&format!(
                        "  {:<12} {:>3}  {:.2}\n",
                        ty.as_str(),
                        ty.default_priority(),
                        ty.default_threshold()
                    ));
                }
            }
            ListCommands::Formats => {
                out.push_str("Output formats:\n");
                for format in OutputFormat::value_variants() {
                    if let Some(value) = format.to_possible_value() {
                        out.push_str(&format!(
                            "  {:<10} {}\n",
                            value.get_name(),
                            value.get_help().map(|h| h.to_string()).unwrap_or_default()
                        ));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_types_includes_every_type() {
        let listing = ListCommands::Types.render();
        for ty in PiiType::ALL {
            assert!(listing.contains(ty.as_str()), "missing {ty}");
        }
        assert!(listing.contains("properNoun"));
        assert!(listing.contains("0.75"));
    }

    #[test]
    fn test_list_formats() {
        let listing = ListCommands::Formats.render();
        assert!(listing.contains("text"));
        assert!(listing.contains("json"));
        assert!(listing.contains("markdown"));
        assert!(listing.contains("Markdown table"));
    }
}
