pub mod config;
pub mod embedding;
pub mod llm;
pub mod loaders;
pub mod logging;
pub mod report;
pub mod vector_store;

pub use config::{AppConfig, Config, ConfigError, PromptsConfig};
pub use embedding::TextEmbedding;
pub use llm::GeminiLlm;
pub use loaders::{load_document, load_ingest_inputs, read_contracts_csv};
pub use logging::init_tracing;
pub use report::PdfReportRenderer;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
