use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ContractMetadata;

/// One hit returned by the search capability for a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub content: String,
    pub score: f32,
    pub agreement_date: Option<NaiveDate>,
    pub effective_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
}

impl SearchResult {
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            score,
            agreement_date: None,
            effective_date: None,
            expiration_date: None,
        }
    }

    pub fn with_metadata(mut self, metadata: &ContractMetadata) -> Self {
        self.agreement_date = metadata.agreement_date;
        self.effective_date = metadata.effective_date;
        self.expiration_date = metadata.expiration_date;
        self
    }

    pub fn metadata(&self) -> ContractMetadata {
        ContractMetadata {
            agreement_date: self.agreement_date,
            effective_date: self.effective_date,
            expiration_date: self.expiration_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub content: String,
    pub score: f32,
    pub metadata: ContractMetadata,
}

impl From<SearchResult> for ContextEntry {
    fn from(result: SearchResult) -> Self {
        let metadata = result.metadata();
        Self {
            content: result.content,
            score: result.score,
            metadata,
        }
    }
}

/// Deduplicated, size-capped search hits handed to synthesis.
///
/// Built only by the aggregator, which guarantees unique contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedContext {
    entries: Vec<ContextEntry>,
}

impl AggregatedContext {
    pub(crate) fn from_entries(entries: Vec<ContextEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the entries as the JSON records embedded in the synthesis prompt.
    pub fn to_prompt_json(&self) -> String {
        let records: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "content": e.content,
                    "metadata": e.metadata,
                })
            })
            .collect();

        serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
    }
}

impl IntoIterator for AggregatedContext {
    type Item = ContextEntry;
    type IntoIter = std::vec::IntoIter<ContextEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
