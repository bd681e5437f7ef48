use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::layout::{build_blocks, paginate, FontStyle, Page, PageGeometry};
use crate::domain::{ports::ReportRenderer, DomainError, SynthesizedResponse};

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Renders analysis reports as A4 PDFs using the standard Helvetica fonts.
#[derive(Debug, Clone)]
pub struct PdfReportRenderer {
    title: String,
    geometry: PageGeometry,
}

impl PdfReportRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            geometry: PageGeometry::default(),
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    fn build_document(&self, pages: &[Page]) -> Result<Document, DomainError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(font_dictionary("Helvetica"));
        let bold = doc.add_object(font_dictionary("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular,
                BOLD_FONT => bold,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in pages {
            let content = page_content(page);
            let encoded = content
                .encode()
                .map_err(|e| DomainError::report(format!("failed to encode page: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::from(self.geometry.width),
                    Object::from(self.geometry.height),
                ],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();
        Ok(doc)
    }
}

impl Default for PdfReportRenderer {
    fn default() -> Self {
        Self::new("Contract Analysis Report")
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn render(
        &self,
        response: &SynthesizedResponse,
        sink: &mut dyn Write,
    ) -> Result<(), DomainError> {
        let blocks = build_blocks(response, &self.title);
        let pages = paginate(&blocks, &self.geometry);
        let mut doc = self.build_document(&pages)?;

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| DomainError::report(format!("failed to serialize PDF: {e}")))?;
        sink.write_all(&buffer)
            .map_err(|e| DomainError::report(format!("failed to write PDF: {e}")))?;

        tracing::debug!(pages = pages.len(), bytes = buffer.len(), "report rendered");
        Ok(())
    }
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn page_content(page: &Page) -> Content {
    let mut operations = Vec::with_capacity(page.lines.len() * 5);
    for line in &page.lines {
        let font = match line.style {
            FontStyle::Regular => REGULAR_FONT,
            FontStyle::Bold => BOLD_FONT,
        };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![font.into(), line.size.into()]));
        operations.push(Operation::new("Td", vec![line.x.into(), line.y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}

/// Maps text to WinAnsi bytes; characters outside the code page become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2026}' => 0x85,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(answer: String, thoughts: Vec<String>) -> SynthesizedResponse {
        SynthesizedResponse {
            answer,
            thought_process: thoughts,
            enough_context: true,
        }
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("\u{2019}"), vec![0x92]);
        assert_eq!(encode_win_ansi("契約"), b"??".to_vec());
    }

    #[test]
    fn test_render_produces_loadable_pdf() {
        let renderer = PdfReportRenderer::default();
        let mut out = Vec::new();

        renderer
            .render(
                &response(
                    "**Compliance Score: 71-100: Excellent**\nStrengths:\nClear terms.".to_string(),
                    vec!["Reviewed payment:".to_string(), "- net 30".to_string()],
                ),
                &mut out,
            )
            .unwrap();

        assert!(out.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_reports_span_multiple_pages() {
        let answer = (0..150)
            .map(|i| format!("Finding {i}: the indemnity clause limits liability to fees paid."))
            .collect::<Vec<_>>()
            .join("\n");
        let thoughts = (0..50).map(|i| format!("- step {i}")).collect();
        let mut out = Vec::new();

        PdfReportRenderer::new("Lease Review")
            .render(&response(answer, thoughts), &mut out)
            .unwrap();

        let doc = Document::load_mem(&out).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");

        PdfReportRenderer::default()
            .render_to_file(&response("Short answer".to_string(), vec![]), &path)
            .unwrap();

        assert!(Document::load(&path).is_ok());
    }
}
