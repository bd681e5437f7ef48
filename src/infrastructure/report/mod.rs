pub mod layout;
pub mod pdf;

pub use layout::PageGeometry;
pub use pdf::PdfReportRenderer;
