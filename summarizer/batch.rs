//! Concurrent summarization of article batches.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::abstractive::RecursiveSummarizer;
use crate::model::SequenceModel;
use crate::telemetry::SummarizerTelemetry;

/// Generated-token cap applied when a request leaves it unset.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 256;

/// One article to summarize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistRequest {
    /// Article title, folded into the task prompt.
    pub title: String,
    /// Article body text.
    pub body: String,
    /// Generated-token cap; defaults to [`DEFAULT_MAX_NEW_TOKENS`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<usize>,
}

/// One finished summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistResponse {
    /// Correlates the response with its request across log lines.
    pub correlation_id: String,
    /// The generated summary.
    pub summary: String,
}

/// Runs summarization requests on blocking worker threads so the async
/// caller is never pinned behind model inference.
pub struct BatchSummarizer<M: SequenceModel + 'static> {
    engine: Arc<RecursiveSummarizer<M>>,
    telemetry: Option<SummarizerTelemetry>,
}

impl<M: SequenceModel + 'static> BatchSummarizer<M> {
    /// Creates a batch controller over a shared engine.
    #[must_use]
    pub fn new(engine: Arc<RecursiveSummarizer<M>>) -> Self {
        Self {
            engine,
            telemetry: None,
        }
    }

    /// Attaches a telemetry handle.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: SummarizerTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Summarizes one request on a blocking thread.
    pub async fn process(&self, request: GistRequest) -> Result<GistResponse> {
        let correlation_id = format!("gist-{}", Uuid::new_v4());
        let engine = Arc::clone(&self.engine);
        let max_new_tokens = request.max_new_tokens.unwrap_or(DEFAULT_MAX_NEW_TOKENS);
        let task = tokio::task::spawn_blocking(move || {
            engine.summarize(&request.title, &request.body, max_new_tokens)
        });
        let summary = task.await??;
        Ok(GistResponse {
            correlation_id,
            summary,
        })
    }

    /// Summarizes a batch, preserving request order in the responses.
    pub async fn process_batch(&self, requests: Vec<GistRequest>) -> Result<Vec<GistResponse>> {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(
                LogLevel::Info,
                "summarizer.batch.start",
                json!({ "requests": requests.len() }),
            );
        }
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            responses.push(self.process(request).await?);
        }
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(
                LogLevel::Info,
                "summarizer.batch.complete",
                json!({ "responses": responses.len() }),
            );
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstractive::SummarizeError;
    use crate::model::testing::{FakeCodec, FakeModel};

    fn batch() -> (BatchSummarizer<FakeModel>, Arc<FakeModel>) {
        let codec = Arc::new(FakeCodec::new());
        let script = vec![codec.intern("gist.")];
        let model = Arc::new(FakeModel::scripted(script));
        let engine = Arc::new(
            RecursiveSummarizer::new(codec, model.clone()).with_token_budget(64),
        );
        (BatchSummarizer::new(engine), model)
    }

    #[tokio::test]
    async fn batch_preserves_order_and_assigns_ids() {
        let (batch, model) = batch();
        let requests = vec![
            GistRequest {
                title: "First".into(),
                body: "First article body".into(),
                max_new_tokens: None,
            },
            GistRequest {
                title: "Second".into(),
                body: "Second article body".into(),
                max_new_tokens: Some(8),
            },
        ];
        let responses = batch.process_batch(requests).await.unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(model.encode_passes(), 2);
        for response in &responses {
            assert!(response.correlation_id.starts_with("gist-"));
            assert_eq!(response.summary, "Gist.");
        }
        assert_ne!(responses[0].correlation_id, responses[1].correlation_id);
    }

    #[tokio::test]
    async fn zero_token_request_fails_the_batch() {
        let (batch, _) = batch();
        let requests = vec![GistRequest {
            title: "Bad".into(),
            body: "Body".into(),
            max_new_tokens: Some(0),
        }];
        let err = batch.process_batch(requests).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SummarizeError>(),
            Some(SummarizeError::InvalidMaxTokens)
        ));
    }
}
