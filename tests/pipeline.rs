use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use contract_analyzer::application::{
    AggregationOptions, AnalysisService, IngestService, SearchAggregator, SynthesisService,
    VectorSearch,
};
use contract_analyzer::domain::{
    ports::{EmbeddingService, LlmService, SearchCapability},
    DomainError, Embedding,
};
use contract_analyzer::infrastructure::{
    loaders::parse_contracts, load_document, load_ingest_inputs, InMemoryVectorStore,
    PdfReportRenderer,
};

const KEYWORDS: [&str; 4] = ["lease", "supply", "termination", "payment"];

const CONTRACTS: &str = "\
Title,Agreement Date,Effective Date,Expiration Date,contract
Office Lease,2020-01-15,2020-02-01,2025-01-31,The tenant shall lease the premises. Termination requires notice.
Supply Agreement,2019-06-01,2019-06-01,2024-05-31,Supply of goods with payment due in 30 days.
Empty Row,,,,
";

/// Counts keyword occurrences, plus a constant component so no vector is zero.
struct KeywordEmbedding;

#[async_trait]
impl EmbeddingService for KeywordEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let lower = text.to_lowercase();
        let mut values: Vec<f32> = KEYWORDS
            .iter()
            .map(|k| lower.matches(k).count() as f32)
            .collect();
        values.push(0.1);
        Ok(Embedding::new(values))
    }
}

struct ScriptedLlm {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn complete_with_system(&self, _system: &str, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(r#"Here is the review:
```json
{"answer": "**Compliance Score: 71-100: Good**\nStrengths:\nTermination notice is defined.",
 "thought_process": ["Compared clauses:", "- termination", "Checked dates"],
 "enough_context": true}
```"#
            .to_string())
    }
}

#[tokio::test]
async fn test_ingest_then_analyze_writes_pdf_report() {
    let store = Arc::new(InMemoryVectorStore::new());
    let search = Arc::new(VectorSearch::new(Arc::new(KeywordEmbedding), store.clone()));

    let documents = parse_contracts(CONTRACTS.as_bytes()).unwrap();
    let report = IngestService::new(search.clone())
        .ingest(&documents, true)
        .await
        .unwrap();
    assert_eq!(report.inserted, 3);
    assert_eq!(store.len(), 3);

    let llm = Arc::new(ScriptedLlm {
        prompts: Mutex::new(Vec::new()),
    });
    let service = AnalysisService::new(
        SearchAggregator::new(search, AggregationOptions::default()),
        Arc::new(SynthesisService::new(llm.clone(), "You review contracts.")),
        Arc::new(PdfReportRenderer::default()),
    );

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("new_lease.txt");
    std::fs::write(&input, "Draft lease with a termination clause.").unwrap();

    let summary = service
        .analyze_batch(&[input.clone()], dir.path(), load_document)
        .await;

    assert!(summary.failures.is_empty(), "{:?}", summary.failures);
    let report_path = dir.path().join("new_lease.txt_analysis_report.pdf");
    assert_eq!(summary.reports, vec![report_path.clone()]);
    let pdf = lopdf::Document::load(&report_path).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);

    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Draft lease with a termination clause."));
    assert!(prompts[0].contains("Office Lease"));
    assert!(prompts[0].contains("2020-02-01"));
}

#[tokio::test]
async fn test_ask_on_empty_store_reports_no_context() {
    let search = Arc::new(VectorSearch::new(
        Arc::new(KeywordEmbedding),
        Arc::new(InMemoryVectorStore::new()),
    ));
    let llm = Arc::new(ScriptedLlm {
        prompts: Mutex::new(Vec::new()),
    });
    let service = AnalysisService::new(
        SearchAggregator::new(search, AggregationOptions::default()),
        Arc::new(SynthesisService::new(llm.clone(), "system")),
        Arc::new(PdfReportRenderer::default()),
    );

    let (context, response) = service.ask("What are the payment terms?").await.unwrap();

    assert!(context.is_empty());
    assert_eq!(
        response.thought_process,
        vec!["Compared clauses:", "- termination", "Checked dates"]
    );
    assert!(llm.prompts.lock().unwrap()[0].contains("# Retrieved information:\n[]"));
}

#[tokio::test]
async fn test_text_file_ingest_is_searchable() {
    let store = Arc::new(InMemoryVectorStore::new());
    let search = Arc::new(VectorSearch::new(Arc::new(KeywordEmbedding), store.clone()));
    let dir = tempfile::tempdir().unwrap();
    let lease = dir.path().join("lease.txt");
    let supply = dir.path().join("supply.txt");
    std::fs::write(&lease, "Lease of the warehouse. Lease renews yearly.").unwrap();
    std::fs::write(&supply, "Supply contract with payment on delivery.").unwrap();

    let inputs = load_ingest_inputs(&[lease, supply]).unwrap();
    let report = IngestService::new(search.clone())
        .with_chunking(8000)
        .ingest(&inputs.files, true)
        .await
        .unwrap();
    assert_eq!(report.inserted, 2);

    let hits = search.search("payment terms for supply", 1).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].content, "Supply contract with payment on delivery.");
}
