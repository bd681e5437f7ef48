//! Turning files on disk into [`Document`](crate::domain::Document)s.

mod contracts_csv;
mod files;

use std::path::{Path, PathBuf};

use crate::domain::{Document, DomainError};

pub use contracts_csv::{parse_contracts, read_contracts_csv};
pub use files::{extract_text, load_document, ExtractError, MIME_PDF, MIME_TEXT};

/// Ingestion inputs split by how they are stored: CSV rows are already one
/// contract each, extracted files are whole contracts to be chunked.
#[derive(Debug, Default)]
pub struct IngestInputs {
    pub rows: Vec<Document>,
    pub files: Vec<Document>,
}

/// Reads every path: `.csv` as contract rows, `.pdf` and `.txt` as files.
/// The first unreadable or unsupported path aborts the load.
pub fn load_ingest_inputs(paths: &[PathBuf]) -> Result<IngestInputs, DomainError> {
    let mut inputs = IngestInputs::default();
    for path in paths {
        if is_csv(path) {
            inputs.rows.extend(read_contracts_csv(path)?);
        } else {
            inputs.files.push(load_document(path)?);
        }
    }
    Ok(inputs)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
