//! Plain text output formatter

use super::{Finding, OutputFormatter};
use anyhow::Result;
use std::io::Write;

/// Plain text formatter - outputs one finding per line
///
/// Columns are tab-separated: source, type, confidence, text, spans.
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn format_finding(&mut self, finding: &Finding) -> Result<()> {
        write!(
            self.writer,
            "{}\t{}\t{:.2}\t{}\t{}",
            finding.source,
            finding.pii_type,
            finding.confidence,
            finding.text.replace(|c: char| c == '\n' || c == '\t', " "),
            finding.span_list()
        )?;
        if !finding.signals.is_empty() {
            write!(self.writer, "\t{}", finding.signals.join(" "))?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::{email, SharedBuffer};

    #[test]
    fn test_one_line_per_finding() {
        let buffer = SharedBuffer::default();
        let mut formatter = TextFormatter::new(buffer.clone());
        formatter.format_finding(&email()).unwrap();
        formatter.finish().unwrap();

        assert_eq!(
            buffer.contents(),
            "memo.txt\temail\t1.00\tjane@acme.io\t6-18,40-52\n"
        );
    }

    #[test]
    fn test_signals_appended() {
        let buffer = SharedBuffer::default();
        let mut formatter = TextFormatter::new(buffer.clone());
        let mut finding = email();
        finding.signals = vec!["capitalization(+0.30)".into()];
        formatter.format_finding(&finding).unwrap();

        assert!(buffer.contents().ends_with("\tcapitalization(+0.30)\n"));
    }
}
