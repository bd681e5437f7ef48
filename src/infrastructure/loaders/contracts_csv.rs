use std::io::Read;
use std::path::Path;

use crate::domain::{ContractMetadata, Document, DocumentMetadata, DomainError};

const AGREEMENT_DATE: &str = "Agreement Date";
const EFFECTIVE_DATE: &str = "Effective Date";
const EXPIRATION_DATE: &str = "Expiration Date";
const CONTRACT_TEXT: &str = "contract";

pub fn read_contracts_csv(path: &Path) -> Result<Vec<Document>, DomainError> {
    let file = std::fs::File::open(path)
        .map_err(|e| DomainError::not_found(format!("{}: {e}", path.display())))?;
    parse_contracts(file)
}

/// Parses one contract per CSV row.
///
/// The three date columns become metadata (unparseable cells are dropped),
/// the `contract` column is appended last as `Contract Text: ...`, and every
/// other column contributes a `Column: value` line.
pub fn parse_contracts<R: Read>(reader: R) -> Result<Vec<Document>, DomainError> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|e| DomainError::validation(format!("invalid CSV header: {e}")))?
        .clone();

    let mut documents = Vec::new();
    for (index, row) in csv.records().enumerate() {
        let row = row.map_err(|e| DomainError::validation(format!("invalid CSV row: {e}")))?;

        let mut metadata = DocumentMetadata::default();
        let mut lines = Vec::new();
        let mut contract_text = None;

        for (column, value) in headers.iter().zip(row.iter()) {
            let value = value.trim();
            match column {
                AGREEMENT_DATE => metadata.dates.agreement_date = ContractMetadata::parse_date(value),
                EFFECTIVE_DATE => metadata.dates.effective_date = ContractMetadata::parse_date(value),
                EXPIRATION_DATE => {
                    metadata.dates.expiration_date = ContractMetadata::parse_date(value)
                }
                CONTRACT_TEXT => contract_text = Some(value).filter(|v| !v.is_empty()),
                _ => {
                    lines.push(format!("{column}: {value}"));
                    metadata.fields.insert(column.to_string(), value.to_string());
                }
            }
        }

        if let Some(text) = contract_text {
            lines.push(format!("Contract Text: {text}"));
        }

        documents.push(Document::new(format!("row-{}", index + 1), lines.join("\n")).with_metadata(metadata));
    }

    tracing::info!(rows = documents.len(), "contracts CSV parsed");
    Ok(documents)
}
