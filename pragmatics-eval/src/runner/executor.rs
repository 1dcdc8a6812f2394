//! Sequential evaluation of items against the prediction oracle

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::prompt::build_prompt;
use crate::config::{Config, DEFAULT_SYSTEM_INSTRUCTION};
use crate::error::{EvalError, EvalResult};
use crate::items::{Item, ItemTable, Prediction, PredictionResult};
use crate::providers::{CompletionRequest, CompletionResponse, LLMProvider, ProviderError};

/// Configuration for the executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub system_instruction: String,
    /// Model override; the provider default is used when unset
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    /// Fixed wait before retrying a rate-limited item
    pub rate_limit_cooldown: Duration,
    /// Retries allowed after a rate-limit failure
    pub max_rate_limit_retries: u32,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            model: None,
            max_tokens: None,
            rate_limit_cooldown: Duration::from_secs(60),
            max_rate_limit_retries: 1,
            timeout_ms: 120_000,
        }
    }
}

impl From<&Config> for ExecutorConfig {
    fn from(config: &Config) -> Self {
        Self {
            system_instruction: config.run.system_instruction.clone(),
            model: Some(config.provider.model.clone()),
            max_tokens: config.provider.max_tokens,
            rate_limit_cooldown: config.run.rate_limit_cooldown(),
            max_rate_limit_retries: config.run.max_rate_limit_retries,
            timeout_ms: config.provider.timeout_ms,
        }
    }
}

/// Runs every item through the oracle, one at a time, in table order
pub struct Executor {
    config: ExecutorConfig,
    oracle: Arc<dyn LLMProvider>,
}

impl Executor {
    pub fn new(oracle: Arc<dyn LLMProvider>, config: ExecutorConfig) -> Self {
        Self { config, oracle }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Evaluate all items, producing exactly one result per item.
    ///
    /// Oracle failures are contained per item; only an empty table aborts.
    pub async fn evaluate(
        &self,
        table: &ItemTable,
        progress: &dyn ProgressCallback,
    ) -> EvalResult<Vec<PredictionResult>> {
        if table.is_empty() {
            return Err(EvalError::EmptyInput);
        }

        let total = table.len();
        tracing::info!(
            "Evaluating {} items with {} ({})",
            total,
            self.oracle.name(),
            self.model_name()
        );

        let mut results = Vec::with_capacity(total);
        for (index, row) in table.rows().iter().enumerate() {
            let prediction = self.predict(&row.item).await;
            let result = PredictionResult::new(row.clone(), prediction);
            progress.on_item_complete(index, total, &result);
            results.push(result);
        }

        Ok(results)
    }

    /// Query the oracle for one item; `None` when the call failed
    pub async fn predict(&self, item: &Item) -> Option<Prediction> {
        let request = self.build_request(item);
        let mut retries = 0;

        loop {
            match self.try_execute(&request).await {
                Ok(response) => return Some(Prediction::normalize(&response.content)),
                Err(ProviderError::RateLimited { .. })
                    if retries < self.config.max_rate_limit_retries =>
                {
                    retries += 1;
                    tracing::warn!(
                        "Rate limited on {}, waiting {}s before retry {}",
                        self.oracle.name(),
                        self.config.rate_limit_cooldown.as_secs(),
                        retries
                    );
                    sleep(self.config.rate_limit_cooldown).await;
                }
                Err(e) => {
                    tracing::error!("Oracle error on {}: {}", self.oracle.name(), e);
                    return None;
                }
            }
        }
    }

    fn build_request(&self, item: &Item) -> CompletionRequest {
        let mut request =
            CompletionRequest::deterministic(&self.config.system_instruction, build_prompt(item));
        if let Some(model) = &self.config.model {
            request = request.with_model(model);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }

    /// Single attempt, bounded by the request timeout
    async fn try_execute(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let timeout = Duration::from_millis(self.config.timeout_ms);

        match tokio::time::timeout(timeout, self.oracle.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }),
        }
    }

    fn model_name(&self) -> &str {
        self.config
            .model
            .as_deref()
            .unwrap_or_else(|| self.oracle.default_model())
    }
}

/// Progress callback for tracking execution
pub trait ProgressCallback: Send + Sync {
    /// Called once per item, right after its result is recorded; `index` is 0-based
    fn on_item_complete(&self, index: usize, total: usize, result: &PredictionResult);
}

/// Default no-op progress callback
pub struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_item_complete(&self, _index: usize, _total: usize, _result: &PredictionResult) {}
}

/// Console progress callback, one line per item
pub struct ConsoleProgress;

impl ConsoleProgress {
    pub fn line(index: usize, total: usize, result: &PredictionResult) -> String {
        let prediction = result
            .model_prediction()
            .map(|p| p.as_str())
            .unwrap_or("None");
        format!(
            "Prompt {}/{} | Gold: {} | Prediction: {} | Correct: {}",
            index + 1,
            total,
            result.gold_label(),
            prediction,
            result.correct_text()
        )
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_item_complete(&self, index: usize, total: usize, result: &PredictionResult) {
        println!("{}", Self::line(index, total, result));
    }
}
