//! Pragmatics evaluation CLI

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pragmatics_eval::{
    analysis::EvaluationSummary,
    config::Config,
    error::EvalError,
    items::{merge_files, ItemTable},
    providers::create_provider,
    reporting::{print_console_report, read_results, write_results, JsonSummary},
    runner::{ConsoleProgress, Executor, ExecutorConfig},
};

#[derive(Parser)]
#[command(name = "pragmatics-eval")]
#[command(about = "Forced-choice pragmatics evaluation of LLMs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Concatenate category item files into one table
    Merge {
        /// Input CSV files, merged in the order given
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Merged output file (overwritten)
        #[arg(short, long, default_value = "data/items_all.csv")]
        output: PathBuf,
    },

    /// Evaluate every item against the configured model
    Run {
        /// Item table to evaluate
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Results CSV (default: results_<model>.csv in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Provider name (openai, anthropic)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model identifier
        #[arg(short, long)]
        model: Option<String>,

        /// Also write a JSON summary next to the results file
        #[arg(long)]
        summary_json: bool,
    },

    /// Recompute the summary from an existing results file
    Report {
        /// Results CSV written by `run`
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Generate sample configuration
    InitConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config/eval.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("pragmatics_eval=debug,info")
    } else {
        EnvFilter::new("pragmatics_eval=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_or_default(),
    };

    match cli.command {
        Commands::Merge { inputs, output } => merge(&inputs, &output),
        Commands::Run {
            input,
            output,
            provider,
            model,
            summary_json,
        } => run_evaluation(config, input, output, provider, model, summary_json).await,
        Commands::Report { input } => report(&input),
        Commands::InitConfig { output } => init_config(&output),
    }
}

fn merge(inputs: &[PathBuf], output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    ensure_parent(output)?;
    let merged = merge_files(inputs, output)?;
    println!(
        "Merged {} files ({} items) into {}",
        inputs.len(),
        merged.len(),
        output.display()
    );
    Ok(())
}

async fn run_evaluation(
    mut config: Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    provider: Option<String>,
    model: Option<String>,
    summary_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(input) = input {
        config.run.input = input;
    }
    if let Some(provider) = provider {
        config.provider.name = provider;
    }
    if let Some(model) = model {
        config.provider.model = model;
    }
    let summary_json = summary_json || config.run.write_json_summary;

    let started_at = Utc::now();
    let run_id = started_at.format("%Y%m%d-%H%M%S").to_string();

    // Structural failures abort here, before any oracle call.
    let items = ItemTable::load(&config.run.input)?;
    if items.is_empty() {
        return Err(EvalError::EmptyInput.into());
    }
    let oracle = create_provider(&config.provider)?;

    println!(
        "Loaded {} prompts. Starting evaluation for model: {}",
        items.len(),
        config.provider.model
    );

    let executor = Executor::new(oracle, ExecutorConfig::from(&config));
    let results = executor.evaluate(&items, &ConsoleProgress).await?;

    let summary = EvaluationSummary::from_results(&results);
    print_console_report(&summary);

    let output = output.unwrap_or_else(|| config.results_path());
    ensure_parent(&output)?;
    write_results(&output, items.headers(), &results)?;

    if summary_json {
        let json_path = summary_path(&output);
        JsonSummary::from_summary(
            &run_id,
            &config.provider.name,
            &config.provider.model,
            &summary,
            output.display().to_string(),
        )
        .write_to_file(&json_path)?;
        println!("JSON summary written to: {}", json_path.display());
    }

    println!("\nExperiment complete. Results saved to '{}'", output.display());
    Ok(())
}

fn report(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let results = read_results(input)?;
    println!("Loaded {} results from {}", results.len(), input.display());
    print_console_report(&EvaluationSummary::from_results(&results));
    Ok(())
}

fn init_config(output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    ensure_parent(output)?;
    Config::default().save_toml(output)?;
    println!("Configuration written to: {}", output.display());
    Ok(())
}

/// `results_gpt_5.csv` -> `results_gpt_5_summary.json`
fn summary_path(results: &Path) -> PathBuf {
    let stem = results
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    results.with_file_name(format!("{}_summary.json", stem))
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
