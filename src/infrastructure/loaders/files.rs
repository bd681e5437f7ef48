use std::path::Path;

use crate::domain::{Document, DomainError};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("text is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl From<ExtractError> for DomainError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Unsupported(_) | ExtractError::Encoding(_) => {
                DomainError::validation(e.to_string())
            }
            ExtractError::Pdf(_) | ExtractError::Io { .. } => DomainError::internal(e.to_string()),
        }
    }
}

/// Plain text of a PDF or UTF-8 text upload.
pub fn extract_text(bytes: Vec<u8>, content_type: &str) -> Result<String, ExtractError> {
    match content_type {
        MIME_PDF => {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
        }
        MIME_TEXT => Ok(String::from_utf8(bytes)?),
        other => Err(ExtractError::Unsupported(other.to_string())),
    }
}

fn content_type_for(path: &Path) -> Result<&'static str, ExtractError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => Ok(MIME_PDF),
        "txt" => Ok(MIME_TEXT),
        _ => Err(ExtractError::Unsupported(path.display().to_string())),
    }
}

/// Reads `.pdf` and `.txt` files; the file name becomes the document name.
pub fn load_document(path: &Path) -> Result<Document, DomainError> {
    let content_type = content_type_for(path)?;
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let text = extract_text(bytes, content_type)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::debug!(name = %name, chars = text.chars().count(), "document extracted");
    Ok(Document::new(name, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_text_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lease.txt");
        std::fs::write(&path, "Tenant shall pay rent monthly.").unwrap();

        let doc = load_document(&path).unwrap();

        assert_eq!(doc.name, "lease.txt");
        assert_eq!(doc.text, "Tenant shall pay rent monthly.");
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lease.docx");
        std::fs::write(&path, b"PK").unwrap();

        assert!(matches!(load_document(&path), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_extract_text_rejects_invalid_utf8() {
        let err = extract_text(vec![0xff, 0xfe], MIME_TEXT).unwrap_err();
        assert!(matches!(err, ExtractError::Encoding(_)));
    }

    #[test]
    fn test_extract_text_rejects_broken_pdf() {
        let err = extract_text(b"not a pdf".to_vec(), MIME_PDF).unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }
}
