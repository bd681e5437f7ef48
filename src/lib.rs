//! Contract analysis over a vector store: ingest contracts, retrieve related
//! clauses for a query or a whole document, and render the model's assessment
//! as a PDF report.

pub mod application;
pub mod domain;
pub mod infrastructure;
