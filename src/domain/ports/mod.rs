mod embedding;
mod llm;
mod report;
mod search;
mod synthesis;
mod vector_store;

pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub use report::ReportRenderer;
pub use search::SearchCapability;
pub use synthesis::Synthesizer;
pub use vector_store::VectorStore;
