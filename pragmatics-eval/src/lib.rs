//! Forced-choice pragmatics evaluation for LLMs
//!
//! This crate merges labeled item tables, asks a prediction oracle to choose
//! between two options for each item, and scores the answers against the gold
//! labels with stratified accuracy and macro-recall.
//!
//! # Example
//!
//! ```no_run
//! use pragmatics_eval::{
//!     analysis::EvaluationSummary,
//!     config::Config,
//!     items::ItemTable,
//!     providers::create_provider,
//!     reporting::{print_console_report, write_results},
//!     runner::{ConsoleProgress, Executor, ExecutorConfig},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default();
//!     let oracle = create_provider(&config.provider)?;
//!     let executor = Executor::new(oracle, ExecutorConfig::from(&config));
//!
//!     let items = ItemTable::load("data/items_all.csv")?;
//!     let results = executor.evaluate(&items, &ConsoleProgress).await?;
//!
//!     print_console_report(&EvaluationSummary::from_results(&results));
//!     write_results(config.results_path(), items.headers(), &results)?;
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod items;
pub mod providers;
pub mod reporting;
pub mod runner;

pub use config::Config;
pub use error::{EvalError, EvalResult};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::analysis::{Breakdown, EvaluationSummary, Metric};
    pub use crate::config::Config;
    pub use crate::error::{EvalError, EvalResult};
    pub use crate::items::{
        merge_files, merge_tables, Item, ItemTable, Label, Prediction, PredictionResult, Table,
    };
    pub use crate::providers::{
        create_provider, CompletionRequest, CompletionResponse, LLMProvider, Message,
        ProviderError, ProviderResult,
    };
    pub use crate::reporting::{print_console_report, read_results, write_results, JsonSummary};
    pub use crate::runner::{ConsoleProgress, Executor, ExecutorConfig, NoOpProgress, ProgressCallback};
}
