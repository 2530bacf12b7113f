//! Markdown output formatter

use super::{Finding, OutputFormatter};
use anyhow::Result;
use std::io::Write;

/// Markdown formatter - outputs findings as a table
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    finding_count: usize,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            finding_count: 0,
        }
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

impl<W: Write + Send + Sync> OutputFormatter for MarkdownFormatter<W> {
    fn format_finding(&mut self, finding: &Finding) -> Result<()> {
        if self.finding_count == 0 {
            writeln!(self.writer, "| Source | Type | Confidence | Text | Spans |")?;
            writeln!(self.writer, "|---|---|---|---|---|")?;
        }
        self.finding_count += 1;
        writeln!(
            self.writer,
            "| {} | {} | {:.2} | `{}` | {} |",
            escape_cell(&finding.source),
            finding.pii_type,
            finding.confidence,
            escape_cell(&finding.text),
            finding.span_list()
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "*Total findings: {}*", self.finding_count)?;
        self.writer.flush()?;
        Ok(())
    }
}
