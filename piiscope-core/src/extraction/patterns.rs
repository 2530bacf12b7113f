//! Structured-pattern recognizers
//!
//! Every recognizer owns one PII type and a handful of regexes. Matches from
//! all of a recognizer's regexes are validated, then reduced to a
//! non-overlapping set (earliest start wins, longest at equal start).
//! Overlap between different types is left to the resolver.

use crate::domain::{Candidate, PiiType, Span};
use crate::error::{CoreError, Result};
use crate::language::{english_lexicon, Lexicon};
use regex::Regex;
use std::sync::OnceLock;

const MONTH: &str = r"(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)";

const STREET_TYPE: &str = r"(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Way|Place|Pl|Terrace|Ter|Parkway|Pkwy|Highway|Hwy|Circle|Cir|Square|Sq)";

/// Post-match hook: adjust or reject a raw regex match
type Refine = fn(&str, Span) -> Option<Span>;

/// One PII type's compiled patterns plus its validator
#[derive(Debug)]
pub struct Recognizer {
    pii_type: PiiType,
    name: &'static str,
    regexes: Vec<Regex>,
    refine: Refine,
}

impl Recognizer {
    /// Compile a recognizer; fails on the first invalid pattern
    pub fn new<I, S>(pii_type: PiiType, name: &'static str, patterns: I, refine: Refine) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let regexes = patterns
            .into_iter()
            .map(|p| {
                Regex::new(p.as_ref())
                    .map_err(|e| CoreError::InvalidPattern(format!("{name}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pii_type,
            name,
            regexes,
            refine,
        })
    }

    /// Type this recognizer emits
    pub fn pii_type(&self) -> PiiType {
        self.pii_type
    }

    /// Recognizer name, recorded in each candidate's origin
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Validated, non-overlapping match spans in `text`
    pub fn find(&self, text: &str) -> Vec<Span> {
        let raw: Vec<Span> = self
            .regexes
            .iter()
            .flat_map(|re| re.find_iter(text))
            .filter_map(|m| (self.refine)(text, Span::new(m.start(), m.end())))
            .filter(|span| !span.is_empty())
            .collect();

        select_non_overlapping(raw)
    }

    /// Candidates for every match in `text`
    pub fn candidates(&self, text: &str) -> Vec<Candidate> {
        self.find(text)
            .into_iter()
            .map(|span| Candidate::from_pattern(self.pii_type, text, span, self.name))
            .collect()
    }
}

/// Earliest start wins; at equal start the longest match wins
fn select_non_overlapping(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by(|a, b| a.start().cmp(&b.start()).then(b.len().cmp(&a.len())));

    let mut kept: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        if kept.last().map_or(true, |last| span.start() >= last.end()) {
            kept.push(span);
        }
    }
    kept
}

fn keep(_text: &str, span: Span) -> Option<Span> {
    Some(span)
}

fn char_before(text: &str, pos: usize) -> Option<char> {
    text[..pos].chars().next_back()
}

fn char_after(text: &str, pos: usize) -> Option<char> {
    text[pos..].chars().next()
}

fn digits(s: &str) -> impl Iterator<Item = u32> + '_ {
    s.chars().filter_map(|c| c.to_digit(10))
}

fn refine_phone(text: &str, span: Span) -> Option<Span> {
    let glued_before = char_before(text, span.start()).is_some_and(|c| c.is_ascii_digit());
    let glued_after = char_after(text, span.end()).is_some_and(|c| c.is_ascii_digit());
    if glued_before || glued_after {
        return None;
    }

    let count = digits(&text[span.start()..span.end()]).count();
    (7..=15).contains(&count).then_some(span)
}

fn refine_url(text: &str, span: Span) -> Option<Span> {
    let matched = &text[span.start()..span.end()];
    let trimmed = matched.trim_end_matches(|c: char| {
        matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']' | '}' | '\'' | '"')
    });

    let end = span.start() + trimmed.len();
    if trimmed.ends_with("://") || trimmed.eq_ignore_ascii_case("www") {
        return None;
    }
    Some(Span::new(span.start(), end))
}

fn refine_ip(text: &str, span: Span) -> Option<Span> {
    // Part of a longer dotted run such as a version string
    let dotted_before = text[..span.start()].ends_with('.')
        && char_before(text, span.start() - 1).is_some_and(|c| c.is_ascii_digit());
    let dotted_after = text[span.end()..].starts_with('.')
        && text[span.end() + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
    if dotted_before || dotted_after {
        return None;
    }

    let valid = text[span.start()..span.end()]
        .split('.')
        .all(|octet| octet.parse::<u16>().is_ok_and(|n| n <= 255));
    valid.then_some(span)
}

fn refine_ssn(text: &str, span: Span) -> Option<Span> {
    let mut parts = text[span.start()..span.end()].split('-');
    let area = parts.next()?;
    let group = parts.next()?;
    let serial = parts.next()?;

    let valid = area != "000"
        && area != "666"
        && !area.starts_with('9')
        && group != "00"
        && serial != "0000";
    valid.then_some(span)
}

/// Luhn checksum over the digits of `number`
pub fn luhn_valid(number: &str) -> bool {
    let digits: Vec<u32> = digits(number).collect();
    if digits.is_empty() {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

fn refine_credit_card(text: &str, span: Span) -> Option<Span> {
    let matched = &text[span.start()..span.end()];
    let count = digits(matched).count();
    ((13..=19).contains(&count) && luhn_valid(matched)).then_some(span)
}

fn build_recognizers(lexicon: &Lexicon) -> Result<Vec<Recognizer>> {
    let mut recognizers = vec![
        Recognizer::new(
            PiiType::Email,
            "email",
            [r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}\b"],
            keep,
        )?,
        Recognizer::new(
            PiiType::Phone,
            "phone",
            [
                r"(?:\+?1[\s.-]?)?(?:\(\d{3}\)\s?|\b\d{3}[\s.-])\d{3}[\s.-]\d{4}\b",
                r"\+\d{1,3}[\s.-]?\(?\d{1,4}\)?(?:[\s.-]?\d{2,4}){2,4}\b",
            ],
            refine_phone,
        )?,
        Recognizer::new(
            PiiType::Money,
            "money",
            [
                r"[$€£¥]\s?\d+(?:,\d{3})*(?:\.\d+)?(?:\s?(?:thousand|million|billion|trillion)\b|[KkMmBb]\b)?",
                r"\b\d+(?:,\d{3})*(?:\.\d+)?\s?(?:dollars?|euros?|pounds?|cents|yen|USD|EUR|GBP|JPY|CAD|AUD|CHF)\b",
                r"\b(?:USD|EUR|GBP|JPY|CAD|AUD|CHF)\s?\d+(?:,\d{3})*(?:\.\d+)?\b",
            ],
            keep,
        )?,
        Recognizer::new(PiiType::Quantity, "quantity", [r"\b\d+(?:[.,]\d+)*\b%?"], keep)?,
        Recognizer::new(
            PiiType::Url,
            "url",
            [r#"\b(?:https?://|www\.)[^\s<>"]+"#],
            refine_url,
        )?,
        Recognizer::new(
            PiiType::IpAddress,
            "ipv4",
            [r"\b(?:\d{1,3}\.){3}\d{1,3}\b"],
            refine_ip,
        )?,
        Recognizer::new(PiiType::Ssn, "ssn", [r"\b\d{3}-\d{2}-\d{4}\b"], refine_ssn)?,
        Recognizer::new(
            PiiType::CreditCard,
            "credit_card",
            [r"\b(?:\d[ -]?){12,18}\d\b"],
            refine_credit_card,
        )?,
        Recognizer::new(
            PiiType::Date,
            "date",
            [
                format!(r"\b{MONTH}\.?\s+\d{{1,2}}(?:st|nd|rd|th)?(?:,?\s+\d{{4}})?\b"),
                format!(r"\b{MONTH}\.?,?\s+\d{{4}}\b"),
                format!(r"\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTH}\.?(?:,?\s+\d{{4}})?\b"),
                r"\b\d{1,2}[/-]\d{1,2}[/-](?:\d{4}|\d{2})\b".to_string(),
                r"\b\d{4}-\d{2}-\d{2}\b".to_string(),
            ],
            keep,
        )?,
        Recognizer::new(
            PiiType::Address,
            "street_address",
            [format!(
                r"\b\d{{1,6}}\s+(?:[A-Z][a-z]+\.?\s+){{1,4}}{STREET_TYPE}\b\.?(?:,?\s+(?:Apt|Suite|Ste|Unit|#)\.?\s*[A-Za-z0-9-]+)?(?:,\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)?(?:,\s+[A-Z]{{2}})?(?:\s+\d{{5}}(?:-\d{{4}})?)?"
            )],
            keep,
        )?,
    ];

    let places = lexicon.locations().names();
    if !places.is_empty() {
        let alternation = places
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        recognizers.push(Recognizer::new(
            PiiType::Location,
            "gazetteer",
            [format!(r"\b(?:{alternation})\b")],
            keep,
        )?);
    }

    Ok(recognizers)
}

static BUILTIN_RECOGNIZERS: OnceLock<Vec<Recognizer>> = OnceLock::new();

fn builtin_recognizers() -> &'static [Recognizer] {
    BUILTIN_RECOGNIZERS.get_or_init(|| {
        build_recognizers(english_lexicon()).expect("Failed to compile built-in recognizers")
    })
}

/// Runs the structured recognizers over a text buffer
#[derive(Debug, Clone, Copy)]
pub struct PatternExtractor {
    recognizers: &'static [Recognizer],
}

impl PatternExtractor {
    /// Extractor over the built-in recognizer set
    pub fn new() -> Self {
        Self {
            recognizers: builtin_recognizers(),
        }
    }

    /// Every structured candidate in `text`, ordered by start offset
    pub fn extract(&self, text: &str) -> Vec<Candidate> {
        self.run(text, |_| true)
    }

    /// Candidates of a single type; properNoun yields nothing here
    pub fn match_type(&self, text: &str, pii_type: PiiType) -> Vec<Candidate> {
        self.run(text, |ty| ty == pii_type)
    }

    /// Candidates of the listed types only
    pub fn extract_types(&self, text: &str, types: &[PiiType]) -> Vec<Candidate> {
        self.run(text, |ty| types.contains(&ty))
    }

    /// Types covered by the loaded recognizers
    pub fn supported_types(&self) -> Vec<PiiType> {
        self.recognizers.iter().map(Recognizer::pii_type).collect()
    }

    fn run<P>(&self, text: &str, wanted: P) -> Vec<Candidate>
    where
        P: Fn(PiiType) -> bool,
    {
        if text.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<Candidate> = self
            .recognizers
            .iter()
            .filter(|r| wanted(r.pii_type()))
            .flat_map(|r| r.candidates(text))
            .collect();
        candidates.sort_by_key(|c| (c.span.start(), c.pii_type));

        log::debug!("pattern extraction produced {} candidates", candidates.len());
        candidates
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(text: &str, ty: PiiType) -> Vec<String> {
        PatternExtractor::new()
            .match_type(text, ty)
            .into_iter()
            .map(|c| c.text)
            .collect()
    }

    #[test]
    fn test_email() {
        assert_eq!(
            found("Write to jane.doe@acme.co.uk today.", PiiType::Email),
            vec!["jane.doe@acme.co.uk"]
        );
        assert!(found("no at sign here", PiiType::Email).is_empty());
    }

    #[test]
    fn test_phone_formats() {
        let text = "Call (555) 123-4567 or 555.987.6543 or +1 555-222-3333.";
        assert_eq!(
            found(text, PiiType::Phone),
            vec!["(555) 123-4567", "555.987.6543", "+1 555-222-3333"]
        );
    }

    #[test]
    fn test_phone_not_glued_to_digits() {
        assert!(found("order 12555-123-45678", PiiType::Phone).is_empty());
    }

    #[test]
    fn test_money_forms() {
        let text = "Paid $1,200.50, then €30, $3 million and 20 USD.";
        assert_eq!(
            found(text, PiiType::Money),
            vec!["$1,200.50", "€30", "$3 million", "20 USD"]
        );
    }

    #[test]
    fn test_quantity_with_percent() {
        assert_eq!(found("Up 12.5% from 1,000", PiiType::Quantity), vec!["12.5%", "1,000"]);
    }

    #[test]
    fn test_url_trailing_punctuation_trimmed() {
        assert_eq!(
            found("See https://example.com/path?q=1. Or www.acme.org!", PiiType::Url),
            vec!["https://example.com/path?q=1", "www.acme.org"]
        );
    }

    #[test]
    fn test_ip_octets_validated() {
        assert_eq!(found("Host 192.168.1.20 up", PiiType::IpAddress), vec!["192.168.1.20"]);
        assert!(found("Bad 999.1.1.1 here", PiiType::IpAddress).is_empty());
        assert!(found("version 1.2.3.4.5", PiiType::IpAddress).is_empty());
    }

    #[test]
    fn test_ssn_rules() {
        assert_eq!(found("SSN 123-45-6789", PiiType::Ssn), vec!["123-45-6789"]);
        assert!(found("SSN 000-45-6789", PiiType::Ssn).is_empty());
        assert!(found("SSN 666-45-6789", PiiType::Ssn).is_empty());
        assert!(found("SSN 912-45-6789", PiiType::Ssn).is_empty());
        assert!(found("SSN 123-00-6789", PiiType::Ssn).is_empty());
        assert!(found("SSN 123-45-0000", PiiType::Ssn).is_empty());
    }

    #[test]
    fn test_credit_card_luhn() {
        assert_eq!(
            found("Card 4111 1111 1111 1111 on file", PiiType::CreditCard),
            vec!["4111 1111 1111 1111"]
        );
        assert!(found("Card 4111 1111 1111 1112 on file", PiiType::CreditCard).is_empty());
        assert!(luhn_valid("79927398713"));
        assert!(!luhn_valid(""));
    }

    #[test]
    fn test_dates() {
        let text = "On Jan 17, 2026 and Dec. 9 and December 2025 and 9 December 2025, \
                    also 01/17/2026 and 2026-01-17.";
        assert_eq!(
            found(text, PiiType::Date),
            vec![
                "Jan 17, 2026",
                "Dec. 9",
                "December 2025",
                "9 December 2025",
                "01/17/2026",
                "2026-01-17"
            ]
        );
    }

    #[test]
    fn test_numbers_inside_dates_are_quantities() {
        let quantities = found("Jan 17, 2026", PiiType::Quantity);
        assert_eq!(quantities, vec!["17", "2026"]);
    }

    #[test]
    fn test_address() {
        assert_eq!(
            found("Ship to 742 Evergreen Terrace, Springfield, IL 62704 now", PiiType::Address),
            vec!["742 Evergreen Terrace, Springfield, IL 62704"]
        );
        assert_eq!(found("at 12 Main St. today", PiiType::Address), vec!["12 Main St."]);
    }

    #[test]
    fn test_location_longest_and_case_sensitive() {
        assert_eq!(
            found("Moved from New York City to Paris", PiiType::Location),
            vec!["New York City", "Paris"]
        );
        assert!(found("paris in lowercase", PiiType::Location).is_empty());
    }

    #[test]
    fn test_proper_noun_not_handled_here() {
        assert!(found("John Smith", PiiType::ProperNoun).is_empty());
    }

    #[test]
    fn test_extract_types_subset() {
        let extractor = PatternExtractor::new();
        let text = "mail a@b.com on 2026-01-17";
        let got = extractor.extract_types(text, &[PiiType::Email]);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].pii_type, PiiType::Email);
        assert!(extractor.extract("").is_empty());
    }

    #[test]
    fn test_extract_sorted_and_confidences() {
        let candidates = PatternExtractor::new().extract("Jan 17, 2026 at a@b.com");
        assert!(candidates
            .windows(2)
            .all(|w| w[0].span.start() <= w[1].span.start()));

        let date = candidates.iter().find(|c| c.pii_type == PiiType::Date).unwrap();
        assert_eq!(date.confidence, 0.8);
        let email = candidates.iter().find(|c| c.pii_type == PiiType::Email).unwrap();
        assert_eq!(email.confidence, 1.0);
    }

    #[test]
    fn test_select_non_overlapping_prefers_longest() {
        let kept = select_non_overlapping(vec![
            Span::new(0, 3),
            Span::new(0, 8),
            Span::new(5, 9),
            Span::new(9, 12),
        ]);
        assert_eq!(kept, vec![Span::new(0, 8), Span::new(9, 12)]);
    }
}
