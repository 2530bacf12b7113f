//! Output formatting module

use anyhow::Result;
use piiscope_core::domain::{context_window, CONTEXT_RADIUS};
use piiscope_core::{Candidate, Entity, EntityRole, PiiType, Span};
use serde::Serialize;
use std::io::Write;

pub mod json;
pub mod markdown;
pub mod text;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format and output a single finding
    fn format_finding(&mut self, finding: &Finding) -> Result<()>;

    /// Finalize output (e.g., write the JSON array)
    fn finish(&mut self) -> Result<()>;
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One finding per line
    Text,
    /// JSON array of findings
    Json,
    /// Markdown table
    Markdown,
}

impl OutputFormat {
    /// Parse a format name as written in a config file
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as clap::ValueEnum>::from_str(name, true).ok()
    }
}

/// Create the formatter for `format` writing to `writer`
pub fn create_formatter(
    format: OutputFormat,
    writer: Box<dyn Write + Send + Sync>,
    pretty_json: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(writer)),
        OutputFormat::Json => Box::new(JsonFormatter::new(writer).pretty(pretty_json)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new(writer)),
    }
}

/// One reportable detection, flattened for output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// File the finding came from
    pub source: String,
    /// Entity id; absent for debug candidates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub pii_type: PiiType,
    pub text: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<EntityRole>,
    /// Every byte range where the text occurs
    pub spans: Vec<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Heuristic signals that fired, for debug candidates
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<String>,
}

impl Finding {
    /// Flatten a published entity
    pub fn from_entity(source: &str, entity: &Entity, text: Option<&str>) -> Self {
        let spans: Vec<Span> = entity.spans().collect();
        let context = text
            .zip(spans.first())
            .map(|(text, span)| context_window(text, *span, CONTEXT_RADIUS));
        Self {
            source: source.to_string(),
            id: Some(entity.id.to_string()),
            pii_type: entity.pii_type,
            text: entity.text.clone(),
            confidence: entity.confidence,
            role: entity.role,
            spans,
            context,
            signals: Vec::new(),
        }
    }

    /// Flatten a raw candidate, keeping its score breakdown
    pub fn from_candidate(source: &str, candidate: &Candidate, include_context: bool) -> Self {
        let signals = candidate
            .breakdown()
            .map(|b| {
                b.contributions
                    .iter()
                    .map(|c| format!("{}({:+.2})", c.signal, c.weight))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            source: source.to_string(),
            id: None,
            pii_type: candidate.pii_type,
            text: candidate.text.clone(),
            confidence: candidate.confidence,
            role: candidate.role(),
            spans: vec![candidate.span],
            context: include_context.then(|| candidate.context.clone()),
            signals,
        }
    }

    /// Spans rendered as `start-end` pairs
    pub fn span_list(&self) -> String {
        self.spans
            .iter()
            .map(|s| format!("{}-{}", s.start(), s.end()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Shared writer for formatter tests
#[cfg(test)]
pub(crate) mod test_support {
    use super::Finding;
    use piiscope_core::{EntityRole, PiiType, Span};
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    pub fn email() -> Finding {
        Finding {
            source: "memo.txt".into(),
            id: Some("e1".into()),
            pii_type: PiiType::Email,
            text: "jane@acme.io".into(),
            confidence: 1.0,
            role: None,
            spans: vec![Span::new(6, 18), Span::new(40, 52)],
            context: None,
            signals: Vec::new(),
        }
    }

    pub fn name() -> Finding {
        Finding {
            source: "memo.txt".into(),
            id: Some("e2".into()),
            pii_type: PiiType::ProperNoun,
            text: "Jane | Doe".into(),
            confidence: 0.85,
            role: Some(EntityRole::Person),
            spans: vec![Span::new(60, 70)],
            context: Some("to Jane | Doe today".into()),
            signals: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piiscope_core::PiiDetector;

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::from_name("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("Markdown"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::from_name("yaml"), None);
    }

    #[test]
    fn test_finding_from_entity() {
        let text = "Write jane@acme.io or jane@acme.io";
        let entities = PiiDetector::new().detect(text, Some(&["emails"]));
        let finding = Finding::from_entity("memo.txt", &entities[0], Some(text));

        assert_eq!(finding.id.as_deref(), Some("e1"));
        assert_eq!(finding.span_list(), "6-18,22-34");
        assert!(finding.context.unwrap().contains("jane@acme.io"));
    }

    #[test]
    fn test_finding_serializes_type_tag() {
        let json = serde_json::to_value(test_support::email()).unwrap();
        assert_eq!(json["type"], "email");
        assert!(json.get("role").is_none());
        assert!(json.get("signals").is_none());
    }
}
