use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Formats accepted for contract dates, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%Y/%m/%d",
];

/// The three dates carried alongside every stored contract and every search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractMetadata {
    pub agreement_date: Option<NaiveDate>,
    pub effective_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
}

impl ContractMetadata {
    /// Parses a free-form date cell. Anything unrecognised becomes `None`.
    pub fn parse_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
                    .ok()
                    .map(|dt| dt.date())
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(flatten)]
    pub dates: ContractMetadata,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Extracted text of one contract. Never mutated after extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            text: text.into(),
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Unit persisted in the vector store: already truncated content plus dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub id: Uuid,
    pub content: String,
    pub metadata: ContractMetadata,
}

impl ContractRecord {
    pub fn new(content: impl Into<String>, metadata: ContractMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 3, 1);
        assert_eq!(ContractMetadata::parse_date("2020-03-01"), expected);
        assert_eq!(ContractMetadata::parse_date("3/1/2020"), expected);
        assert_eq!(ContractMetadata::parse_date("March 1, 2020"), expected);
        assert_eq!(ContractMetadata::parse_date("2020-03-01T00:00:00"), expected);
    }

    #[test]
    fn test_parse_date_coerces_garbage_to_none() {
        assert_eq!(ContractMetadata::parse_date(""), None);
        assert_eq!(ContractMetadata::parse_date("   "), None);
        assert_eq!(ContractMetadata::parse_date("perpetual"), None);
        assert_eq!(ContractMetadata::parse_date("2020-13-45"), None);
    }

    #[test]
    fn test_document_is_empty() {
        assert!(Document::new("blank.txt", " \n ").is_empty());
        assert!(!Document::new("a.txt", "text").is_empty());
    }
}
