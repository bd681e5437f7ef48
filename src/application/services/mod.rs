mod aggregator;
mod analysis;
mod ingest;
mod search;
mod synthesis;

pub use aggregator::{AggregationOptions, Ranking, SearchAggregator};
pub use analysis::{report_path, AnalysisService, BatchSummary, Pacing};
pub use ingest::{IngestReport, IngestService};
pub use search::VectorSearch;
pub use synthesis::SynthesisService;
