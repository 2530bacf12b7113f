//! JSON output formatter

use super::{Finding, OutputFormatter};
use anyhow::Result;
use std::io::Write;

/// JSON formatter - outputs findings as a JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    findings: Vec<Finding>,
    pretty: bool,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter (pretty-printed)
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            findings: Vec::new(),
            pretty: true,
        }
    }

    /// Choose between pretty and compact output
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn format_finding(&mut self, finding: &Finding) -> Result<()> {
        self.findings.push(finding.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &self.findings)?;
        } else {
            serde_json::to_writer(&mut self.writer, &self.findings)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
