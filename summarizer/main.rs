//! Runtime wiring: model loading, lexicon loading, and the console
//! serving loop.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use serde_json::json;
use shared_logging::LogLevel;
use tokio::sync::mpsc;

use crate::abstractive::RecursiveSummarizer;
use crate::batch::{BatchSummarizer, GistRequest};
use crate::console::{ConsoleCommand, ConsoleCommandReceiver};
use crate::extractive::{score_sentences, Extraction, Lexicon, StratifiedSelector};
use crate::model::{SubwordCodec, T5Session, TokenCodec};
use crate::telemetry::SummarizerTelemetry;

/// Filesystem locations the runtime loads from.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    /// Directory holding `config.json` and `model.safetensors`.
    pub model_dir: PathBuf,
    /// The `tokenizer.json` file.
    pub tokenizer_file: PathBuf,
    /// Directory holding the lexicon word lists.
    pub lexicon_dir: PathBuf,
    /// Optional JSON-lines log destination.
    pub log_path: Option<PathBuf>,
}

/// Fully wired summarization runtime.
pub struct SummarizerRuntime {
    batch: BatchSummarizer<T5Session>,
    engine: Arc<RecursiveSummarizer<T5Session>>,
    codec: Arc<dyn TokenCodec>,
    lexicon: Lexicon,
    selector: StratifiedSelector,
    telemetry: Option<SummarizerTelemetry>,
}

impl SummarizerRuntime {
    /// Loads the tokenizer, model, and lexicon, and wires the pipeline.
    pub fn bootstrap(paths: &RuntimePaths) -> Result<Self> {
        let telemetry = paths.log_path.as_ref().and_then(|path| {
            SummarizerTelemetry::builder("summarizer")
                .log_path(path)
                .build()
                .ok()
        });
        let codec: Arc<dyn TokenCodec> = Arc::new(
            SubwordCodec::from_file(&paths.tokenizer_file)
                .with_context(|| format!("loading tokenizer from {:?}", paths.tokenizer_file))?,
        );
        let session = Arc::new(
            T5Session::load(&paths.model_dir)
                .with_context(|| format!("loading model from {:?}", paths.model_dir))?,
        );
        let lexicon = Lexicon::load(&paths.lexicon_dir)?;
        let mut engine = RecursiveSummarizer::new(Arc::clone(&codec), session);
        if let Some(tel) = &telemetry {
            engine = engine.with_telemetry(tel.clone());
        }
        let engine = Arc::new(engine);
        let mut batch = BatchSummarizer::new(Arc::clone(&engine));
        if let Some(tel) = &telemetry {
            batch = batch.with_telemetry(tel.clone());
        }
        if let Some(tel) = &telemetry {
            let _ = tel.log(
                LogLevel::Info,
                "summarizer.runtime.ready",
                json!({ "model_dir": paths.model_dir.display().to_string() }),
            );
        }
        Ok(Self {
            batch,
            engine,
            codec,
            lexicon,
            selector: StratifiedSelector::default(),
            telemetry,
        })
    }

    /// Summarizes one article synchronously.
    pub fn summarize(&self, title: &str, body: &str, max_new_tokens: usize) -> Result<String> {
        Ok(self.engine.summarize(title, body, max_new_tokens)?)
    }

    /// Scores each sentence of the text and selects a budget-sized,
    /// position-balanced subset, preserving article order.
    pub fn extract_optimal(&self, text: &str) -> Result<Extraction> {
        let sentences: Vec<String> = text.split(". ").map(str::to_string).collect();
        let scored = score_sentences(&sentences, &self.lexicon);
        Ok(self.selector.select(&scored, self.codec.as_ref())?)
    }

    /// Serves console commands until `quit`, writing one JSON response
    /// line per summarized article.
    pub async fn serve_console(&self) -> Result<()> {
        let (sender, mut commands) = mpsc::unbounded_channel();
        let receiver = ConsoleCommandReceiver::new(sender, self.telemetry.clone());
        let ingest = tokio::spawn(async move { receiver.run().await });
        while let Some(command) = commands.recv().await {
            match command {
                ConsoleCommand::Summarize {
                    title,
                    body,
                    max_new_tokens,
                } => {
                    let response = self
                        .batch
                        .process(GistRequest {
                            title,
                            body,
                            max_new_tokens,
                        })
                        .await?;
                    println!("{}", serde_json::to_string(&response)?);
                }
                ConsoleCommand::Quit => break,
            }
        }
        ingest.await??;
        Ok(())
    }
}
