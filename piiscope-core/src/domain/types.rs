//! Core value types shared by every detection stage

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The fixed enumeration of PII kinds the detector knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PiiType {
    /// Email address
    Email,
    /// Telephone number
    Phone,
    /// Monetary amount
    Money,
    /// Bare number or percentage
    Quantity,
    /// Web address
    Url,
    /// IPv4 address
    IpAddress,
    /// US social security number
    Ssn,
    /// Payment card number
    CreditCard,
    /// Calendar date
    Date,
    /// Street address
    Address,
    /// Known place name
    Location,
    /// Capitalized free-form name (person, company, ...)
    ProperNoun,
}

impl PiiType {
    /// Every type, in declaration order
    pub const ALL: [PiiType; 12] = [
        PiiType::Email,
        PiiType::Phone,
        PiiType::Money,
        PiiType::Quantity,
        PiiType::Url,
        PiiType::IpAddress,
        PiiType::Ssn,
        PiiType::CreditCard,
        PiiType::Date,
        PiiType::Address,
        PiiType::Location,
        PiiType::ProperNoun,
    ];

    /// Internal tag, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiType::Email => "email",
            PiiType::Phone => "phone",
            PiiType::Money => "money",
            PiiType::Quantity => "quantity",
            PiiType::Url => "url",
            PiiType::IpAddress => "ipAddress",
            PiiType::Ssn => "ssn",
            PiiType::CreditCard => "creditCard",
            PiiType::Date => "date",
            PiiType::Address => "address",
            PiiType::Location => "location",
            PiiType::ProperNoun => "properNoun",
        }
    }

    /// Whether candidates of this type come from a structured recognizer
    /// (and therefore carry a fixed confidence)
    pub fn is_pattern_based(&self) -> bool {
        !matches!(self, PiiType::ProperNoun)
    }

    /// Map a UI-facing name to a type.
    ///
    /// Accepts singular and plural spellings in camelCase, snake_case or
    /// kebab-case, case-insensitively (`email`, `emails`, `ip_addresses`,
    /// `credit-cards`, `names`).
    pub fn from_ui_name(name: &str) -> Option<PiiType> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let ty = match normalized.as_str() {
            "email" | "emails" | "emailaddress" | "emailaddresses" => PiiType::Email,
            "phone" | "phones" | "phonenumber" | "phonenumbers" => PiiType::Phone,
            "money" | "monies" | "currency" => PiiType::Money,
            "quantity" | "quantities" | "number" | "numbers" => PiiType::Quantity,
            "url" | "urls" => PiiType::Url,
            "ip" | "ips" | "ipaddress" | "ipaddresses" => PiiType::IpAddress,
            "ssn" | "ssns" => PiiType::Ssn,
            "creditcard" | "creditcards" => PiiType::CreditCard,
            "date" | "dates" => PiiType::Date,
            "address" | "addresses" => PiiType::Address,
            "location" | "locations" => PiiType::Location,
            "propernoun" | "propernouns" | "name" | "names" => PiiType::ProperNoun,
            _ => return None,
        };
        Some(ty)
    }

    /// Built-in arbitration priority
    pub fn default_priority(&self) -> i32 {
        match self {
            PiiType::Date => 90,
            PiiType::Email | PiiType::Ssn | PiiType::CreditCard => 85,
            PiiType::Phone => 80,
            PiiType::Url | PiiType::IpAddress => 75,
            PiiType::Money => 70,
            PiiType::Address => 60,
            PiiType::Quantity => 40,
            PiiType::Location => 30,
            PiiType::ProperNoun => 10,
        }
    }

    /// Built-in publication threshold
    pub fn default_threshold(&self) -> f64 {
        match self {
            PiiType::ProperNoun => 0.75,
            _ => 0.0,
        }
    }

    /// Fixed confidence attached to structured candidates of this type
    pub fn pattern_confidence(&self) -> f64 {
        match self {
            PiiType::Date => 0.8,
            PiiType::Address => 0.7,
            PiiType::Location => 0.9,
            _ => 1.0,
        }
    }
}

impl fmt::Display for PiiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PiiType::from_ui_name(s).ok_or_else(|| format!("unknown PII type: {s}"))
    }
}

/// Half-open `[start, end)` byte range into a text buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span.
    ///
    /// # Panics
    ///
    /// Panics if `end < start`. Recognizers only ever produce ordered ranges,
    /// so a reversed span means an upstream bug that would corrupt the
    /// overlap sweep.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "invalid span: end {end} < start {start}");
        Self { start, end }
    }

    /// Start offset (inclusive)
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive)
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `pos` lies inside the span
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Gap in bytes between two spans (0 when they touch or overlap)
    pub fn distance(&self, other: &Span) -> usize {
        if self.end <= other.start {
            other.start - self.end
        } else if other.end <= self.start {
            self.start - other.end
        } else {
            0
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Semantic role of an accepted proper-noun run, used downstream to pick a
/// replacement value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    /// Organization name
    Company,
    /// Personal name
    Person,
    /// A single unknown word that could be either
    CompanyOrPerson,
}

impl EntityRole {
    /// Snake-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityRole::Company => "company",
            EntityRole::Person => "person",
            EntityRole::CompanyOrPerson => "company_or_person",
        }
    }
}

/// The set of types a caller wants reported
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnabledTypes {
    types: BTreeSet<PiiType>,
}

impl EnabledTypes {
    /// Every type
    pub fn all() -> Self {
        Self::from_types(PiiType::ALL)
    }

    /// Exactly the given types
    pub fn from_types<I: IntoIterator<Item = PiiType>>(types: I) -> Self {
        Self {
            types: types.into_iter().collect(),
        }
    }

    /// Parse user-facing names; unknown names are logged and skipped
    pub fn parse<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut types = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            match PiiType::from_ui_name(name) {
                Some(ty) => {
                    types.insert(ty);
                }
                None => log::warn!("ignoring unknown PII type name: {name:?}"),
            }
        }
        Self { types }
    }

    /// All types when `names` is `None`, otherwise the parsed subset
    pub fn from_option(names: Option<&[&str]>) -> Self {
        match names {
            Some(names) => Self::parse(names),
            None => Self::all(),
        }
    }

    pub fn contains(&self, ty: PiiType) -> bool {
        self.types.contains(&ty)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Enabled types in declaration order
    pub fn iter(&self) -> impl Iterator<Item = PiiType> + '_ {
        self.types.iter().copied()
    }
}
