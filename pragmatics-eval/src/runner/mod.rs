//! Evaluation engine

pub mod executor;
pub mod prompt;

pub use executor::{ConsoleProgress, Executor, ExecutorConfig, NoOpProgress, ProgressCallback};
pub use prompt::{build_prompt, ANSWER_INSTRUCTION};
