use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rig::client::ProviderClient;
use rig::providers::gemini;
use tracing::info;

use contract_analyzer::application::{
    AnalysisService, IngestService, Retrying, SearchAggregator, SynthesisService, VectorSearch,
};
use contract_analyzer::domain::{
    ports::{EmbeddingService, ReportRenderer},
    ResponseKind,
};
use contract_analyzer::infrastructure::{
    init_tracing, load_document, load_ingest_inputs, AppConfig, GeminiLlm, PdfReportRenderer,
    QdrantVectorStore, TextEmbedding,
};

#[derive(Debug, Parser)]
#[command(
    name = "contract-analyzer",
    version,
    about = "Contract analysis with retrieval-augmented generation"
)]
struct Cli {
    /// Runtime settings file
    #[arg(long, default_value = "./config/config.yaml")]
    config: PathBuf,

    /// Prompt texts file
    #[arg(long, default_value = "./config/prompts.yaml")]
    prompts: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load contracts into the vector store: `.csv` rows, `.pdf` or `.txt` files
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Append instead of replacing stored contracts
        #[arg(long)]
        keep_existing: bool,
    },
    /// Analyse PDF or text contracts and write one report per file
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Ask a single question against the stored contracts
    Ask {
        question: String,
        #[arg(long, default_value = "report.pdf")]
        out: PathBuf,
        /// Print the model's plain answer, without a report
        #[arg(long)]
        raw: bool,
    },
}

/// Adapters shared by every subcommand, built once at startup.
struct Pipeline {
    app: AppConfig,
    client: gemini::Client,
    search: Arc<VectorSearch>,
}

impl Pipeline {
    async fn connect(app: AppConfig) -> anyhow::Result<Self> {
        std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?;
        let client = gemini::Client::from_env();
        let config = &app.config;

        let embedding: Arc<dyn EmbeddingService> = Arc::new(Retrying::new(
            Arc::new(TextEmbedding::new(client.clone(), &config.embedding)),
            config.retry.policy(),
        ));
        let vector_store = Arc::new(
            QdrantVectorStore::new(
                &config.vector_store.url,
                &config.vector_store.collection,
                config.embedding.dimension,
            )
            .await?,
        );
        info!(
            url = %config.vector_store.url,
            collection = %config.vector_store.collection,
            "vector store ready"
        );

        let search = Arc::new(
            VectorSearch::new(embedding, vector_store).with_max_bytes(config.pipeline.max_bytes),
        );
        Ok(Self {
            app,
            client,
            search,
        })
    }

    fn aggregator(&self) -> SearchAggregator {
        SearchAggregator::new(
            self.search.clone(),
            self.app.config.pipeline.aggregation_options(),
        )
    }

    fn synthesis(&self) -> Arc<SynthesisService> {
        let llm = Arc::new(GeminiLlm::new(self.client.clone(), &self.app.config.llm));
        Arc::new(SynthesisService::new(
            llm,
            self.app.prompts.synthesis.system.clone(),
        ))
    }

    fn renderer(&self) -> Arc<dyn ReportRenderer> {
        Arc::new(PdfReportRenderer::new(self.app.config.report.title.clone()))
    }

    fn analysis(&self) -> AnalysisService {
        let synthesizer = Arc::new(Retrying::new(self.synthesis(), self.app.config.retry.policy()));
        AnalysisService::new(self.aggregator(), synthesizer, self.renderer())
            .with_pacing(self.app.config.pacing.pacing())
    }

    async fn ingest(&self, paths: &[PathBuf], keep_existing: bool) -> anyhow::Result<()> {
        let inputs = load_ingest_inputs(paths)?;
        let pipeline = &self.app.config.pipeline;
        let rows = IngestService::new(self.search.clone()).with_max_bytes(pipeline.max_bytes);
        let files = IngestService::new(self.search.clone())
            .with_max_bytes(pipeline.max_bytes)
            .with_chunking(pipeline.chunk_size);

        let from_rows = rows.ingest(&inputs.rows, !keep_existing).await?;
        let from_files = files.ingest(&inputs.files, false).await?;
        println!(
            "Inserted {} records from {} rows and {} files ({} skipped)",
            from_rows.inserted + from_files.inserted,
            inputs.rows.len(),
            inputs.files.len(),
            from_rows.skipped + from_files.skipped
        );
        Ok(())
    }

    async fn analyze(&self, files: &[PathBuf], out_dir: Option<PathBuf>) -> anyhow::Result<()> {
        let out_dir =
            out_dir.unwrap_or_else(|| PathBuf::from(&self.app.config.report.output_dir));
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;

        let summary = self
            .analysis()
            .analyze_batch(files, &out_dir, load_document)
            .await;
        for report in &summary.reports {
            println!("Report written: {}", report.display());
        }
        for (path, error) in &summary.failures {
            eprintln!("Failed: {}: {error}", path.display());
        }
        if summary.reports.is_empty() {
            anyhow::bail!("no report could be generated");
        }
        Ok(())
    }

    async fn ask(&self, question: &str, out: &Path) -> anyhow::Result<()> {
        let (_, response) = self.analysis().ask(question).await?;

        println!("{}\n", response.answer);
        println!("Thought process:");
        for thought in &response.thought_process {
            println!("  - {thought}");
        }
        println!("\nEnough context: {}", response.enough_context);

        self.renderer().render_to_file(&response, out)?;
        println!("Report written: {}", out.display());
        Ok(())
    }

    async fn ask_raw(&self, question: &str) -> anyhow::Result<()> {
        let context = self.aggregator().aggregate(question).await?;
        let policy = self.app.config.retry.policy();
        let synthesis = self.synthesis();

        let response = policy
            .run("synthesis", || {
                synthesis.complete(ResponseKind::Generic, question, &context)
            })
            .await?;
        println!("{}", response.text());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let app = AppConfig::load(&cli.config, &cli.prompts)?;
    let pipeline = Pipeline::connect(app).await?;

    match cli.command {
        Command::Ingest {
            paths,
            keep_existing,
        } => pipeline.ingest(&paths, keep_existing).await,
        Command::Analyze { files, out_dir } => pipeline.analyze(&files, out_dir).await,
        Command::Ask {
            question,
            raw: true,
            ..
        } => pipeline.ask_raw(&question).await,
        Command::Ask { question, out, .. } => pipeline.ask(&question, &out).await,
    }
}
