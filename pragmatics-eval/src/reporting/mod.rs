//! Results reporting

pub mod csv_writer;

pub use csv_writer::{read_results, results_table, write_results};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

use crate::analysis::{Breakdown, EvaluationSummary};

/// JSON summary export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummary {
    pub run_id: String,
    pub timestamp: String,
    pub provider: String,
    pub model: String,
    pub total_items: usize,
    pub correct_items: usize,
    pub accuracy: f64,
    pub macro_recall: f64,
    pub accuracy_by_phenomenon: IndexMap<String, f64>,
    pub accuracy_by_domain: IndexMap<String, f64>,
    pub accuracy_by_role_direction: IndexMap<String, f64>,
    pub recall_by_gold_label: IndexMap<String, f64>,
    pub results_file: String,
}

fn percentages(breakdown: &Breakdown) -> IndexMap<String, f64> {
    breakdown
        .iter()
        .map(|(key, metric)| (key.to_string(), metric.percentage()))
        .collect()
}

impl JsonSummary {
    /// Create from an evaluation summary
    pub fn from_summary(
        run_id: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        summary: &EvaluationSummary,
        results_file: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            provider: provider.into(),
            model: model.into(),
            total_items: summary.total(),
            correct_items: summary.overall.correct,
            accuracy: summary.accuracy(),
            macro_recall: summary.macro_recall(),
            accuracy_by_phenomenon: percentages(&summary.by_phenomenon),
            accuracy_by_domain: percentages(&summary.by_domain),
            accuracy_by_role_direction: percentages(&summary.by_role_direction),
            recall_by_gold_label: percentages(&summary.by_gold_label),
            results_file: results_file.into(),
        }
    }

    /// Write to JSON file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

fn write_breakdown(out: &mut String, title: &str, breakdown: &Breakdown) {
    let _ = writeln!(out, "\nAccuracy by {}:", title);
    for (key, metric) in breakdown.iter() {
        let _ = writeln!(out, "{:<15}: {:.2}%", key, metric.percentage());
    }
}

/// Render the summary block shown at the end of a run
pub fn format_report(summary: &EvaluationSummary) -> String {
    let mut out = String::from("\n--- Quantitative Analysis ---\n");

    let _ = writeln!(
        out,
        "\nTotal Accuracy: {:.2}% ({}/{} correct)",
        summary.accuracy(),
        summary.overall.correct,
        summary.total()
    );

    write_breakdown(&mut out, "Phenomenon", &summary.by_phenomenon);
    write_breakdown(&mut out, "Domain", &summary.by_domain);
    write_breakdown(&mut out, "Role-Direction", &summary.by_role_direction);

    let _ = writeln!(out, "\nMacro-Recall: {:.2}%", summary.macro_recall());
    out
}

/// Print the summary block to stdout
pub fn print_console_report(summary: &EvaluationSummary) {
    print!("{}", format_report(summary));
}
