use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::application::services::SearchAggregator;
use crate::domain::{
    ports::{ReportRenderer, Synthesizer},
    AggregatedContext, Document, DomainError, SynthesizedResponse,
};

const REPORT_SUFFIX: &str = "_analysis_report.pdf";

/// Fixed pauses between external calls to stay under provider rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pacing {
    /// Before the context search and again before synthesis.
    pub call_delay: Duration,
    /// Between two files of a batch.
    pub file_delay: Duration,
}

impl Pacing {
    pub fn new(call_delay: Duration, file_delay: Duration) -> Self {
        Self {
            call_delay,
            file_delay,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
}

/// Runs documents through search aggregation, synthesis and report rendering.
pub struct AnalysisService {
    aggregator: SearchAggregator,
    synthesizer: Arc<dyn Synthesizer>,
    renderer: Arc<dyn ReportRenderer>,
    pacing: Pacing,
}

impl AnalysisService {
    pub fn new(
        aggregator: SearchAggregator,
        synthesizer: Arc<dyn Synthesizer>,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self {
            aggregator,
            synthesizer,
            renderer,
            pacing: Pacing::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Answers a single question against the stored corpus.
    #[instrument(skip(self, question))]
    pub async fn ask(
        &self,
        question: &str,
    ) -> Result<(AggregatedContext, SynthesizedResponse), DomainError> {
        let context = self.aggregator.aggregate(question).await?;
        let response = self.synthesizer.generate_response(question, &context).await?;
        Ok((context, response))
    }

    /// Analyses a whole contract, using its own text as the question.
    #[instrument(skip(self, document), fields(name = %document.name))]
    pub async fn analyze(&self, document: &Document) -> Result<SynthesizedResponse, DomainError> {
        pause(self.pacing.call_delay).await;
        let context = self.aggregator.aggregate(&document.text).await?;

        pause(self.pacing.call_delay).await;
        self.synthesizer
            .generate_response(&document.text, &context)
            .await
    }

    pub async fn analyze_to_report(
        &self,
        document: &Document,
        out_path: &Path,
    ) -> Result<SynthesizedResponse, DomainError> {
        let response = self.analyze(document).await?;
        self.renderer.render_to_file(&response, out_path)?;
        tracing::info!(report = %out_path.display(), "report written");
        Ok(response)
    }

    /// Analyses every file in turn. A failing file is recorded and skipped.
    #[instrument(skip(self, paths, load), fields(files = paths.len()))]
    pub async fn analyze_batch<L>(&self, paths: &[PathBuf], out_dir: &Path, load: L) -> BatchSummary
    where
        L: Fn(&Path) -> Result<Document, DomainError>,
    {
        let mut summary = BatchSummary::default();

        for (i, path) in paths.iter().enumerate() {
            if i > 0 {
                pause(self.pacing.file_delay).await;
            }

            tracing::info!(file = %path.display(), "processing");
            let out_path = report_path(out_dir, path);
            let outcome = match load(path) {
                Ok(document) => self.analyze_to_report(&document, &out_path).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(_) => summary.reports.push(out_path),
                Err(e) => {
                    tracing::error!(file = %path.display(), error = %e, "analysis failed, continuing");
                    summary.failures.push((path.clone(), e.to_string()));
                }
            }
        }

        summary
    }
}

/// `<out_dir>/<file name>_analysis_report.pdf`
pub fn report_path(out_dir: &Path, source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    out_dir.join(format!("{name}{REPORT_SUFFIX}"))
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::AggregationOptions;
    use crate::domain::{ports::SearchCapability, SearchResult};
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;

    struct EchoSearch;

    #[async_trait]
    impl SearchCapability for EchoSearch {
        async fn search(&self, query: &str, _limit: usize) -> Result<Vec<SearchResult>, DomainError> {
            Ok(vec![SearchResult::new(format!("match for {query}"), 0.5)])
        }
    }

    struct CountingSynthesizer {
        contexts: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Synthesizer for CountingSynthesizer {
        async fn generate_response(
            &self,
            question: &str,
            context: &AggregatedContext,
        ) -> Result<SynthesizedResponse, DomainError> {
            self.contexts.lock().unwrap().push(context.len());
            Ok(SynthesizedResponse {
                answer: format!("About: {question}"),
                thought_process: vec!["Checked".to_string()],
                enough_context: !context.is_empty(),
            })
        }
    }

    /// Writes the answer verbatim instead of a PDF.
    struct PlainRenderer;

    impl ReportRenderer for PlainRenderer {
        fn render(
            &self,
            response: &SynthesizedResponse,
            sink: &mut dyn Write,
        ) -> Result<(), DomainError> {
            sink.write_all(response.answer.as_bytes())
                .map_err(|e| DomainError::report(e.to_string()))
        }
    }

    fn service() -> (AnalysisService, Arc<CountingSynthesizer>) {
        let synthesizer = Arc::new(CountingSynthesizer {
            contexts: Mutex::new(Vec::new()),
        });
        let aggregator = SearchAggregator::new(Arc::new(EchoSearch), AggregationOptions::default());
        let service = AnalysisService::new(aggregator, synthesizer.clone(), Arc::new(PlainRenderer));
        (service, synthesizer)
    }

    #[test]
    fn test_report_path_keeps_source_extension() {
        let path = report_path(Path::new("/out"), Path::new("/in/lease.pdf"));
        assert_eq!(path, PathBuf::from("/out/lease.pdf_analysis_report.pdf"));
    }

    #[tokio::test]
    async fn test_ask_returns_context_and_answer() {
        let (service, _) = service();

        let (context, response) = service.ask("renewal terms").await.unwrap();

        assert_eq!(context.entries()[0].content, "match for renewal terms");
        assert_eq!(response.answer, "About: renewal terms");
        assert!(response.enough_context);
    }

    #[tokio::test]
    async fn test_analyze_batch_continues_after_failure() {
        let (service, synthesizer) = service();
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![PathBuf::from("good.txt"), PathBuf::from("bad.bin")];

        let summary = service
            .analyze_batch(&paths, dir.path(), |path| {
                if path.extension().is_some_and(|e| e == "txt") {
                    Ok(Document::new("good.txt", "Lease agreement"))
                } else {
                    Err(DomainError::validation("unsupported file type"))
                }
            })
            .await;

        assert_eq!(summary.reports, vec![dir.path().join("good.txt_analysis_report.pdf")]);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, PathBuf::from("bad.bin"));
        assert_eq!(
            std::fs::read_to_string(&summary.reports[0]).unwrap(),
            "About: Lease agreement"
        );
        assert_eq!(*synthesizer.contexts.lock().unwrap(), vec![1]);
    }
}
