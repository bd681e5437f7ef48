mod document;
mod embedding;
mod response;
mod search;

pub use document::{ContractMetadata, ContractRecord, Document, DocumentMetadata};
pub use embedding::Embedding;
pub use response::{GenericResponse, ModelResponse, ResponseKind, SynthesizedResponse};
pub use search::{AggregatedContext, ContextEntry, SearchResult};
