//! Accuracy metrics calculation

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::items::{Label, PredictionResult};

/// A `(correct, total)` accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub correct: usize,
    pub total: usize,
}

impl Metric {
    pub fn new(correct: usize, total: usize) -> Self {
        Self { correct, total }
    }

    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Fraction correct in `[0, 1]`; 0 when nothing was recorded
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }

    /// Percentage correct in `[0, 100]`
    pub fn percentage(&self) -> f64 {
        self.rate() * 100.0
    }
}

/// Metrics keyed by category value, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breakdown(IndexMap<String, Metric>);

impl Breakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str, correct: bool) {
        if let Some(metric) = self.0.get_mut(key) {
            metric.record(correct);
        } else {
            let mut metric = Metric::default();
            metric.record(correct);
            self.0.insert(key.to_string(), metric);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Metric> {
        self.0.get(key)
    }

    /// Metric for `key`, empty if the key was never seen
    pub fn metric(&self, key: &str) -> Metric {
        self.get(key).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Metric)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything reported about one evaluation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub overall: Metric,
    pub by_phenomenon: Breakdown,
    pub by_domain: Breakdown,
    pub by_role_direction: Breakdown,
    /// Recall partitions keyed by gold label
    pub by_gold_label: Breakdown,
}

impl EvaluationSummary {
    /// Aggregate all results in a single pass
    pub fn from_results(results: &[PredictionResult]) -> Self {
        let mut summary = Self::default();

        for result in results {
            let correct = result.is_correct();
            let item = &result.item;

            summary.overall.record(correct);
            summary.by_phenomenon.record(&item.phenomenon, correct);
            summary.by_domain.record(&item.domain, correct);
            summary.by_role_direction.record(&item.role_direction, correct);
            summary.by_gold_label.record(item.gold_label.as_str(), correct);
        }

        summary
    }

    pub fn total(&self) -> usize {
        self.overall.total
    }

    /// Overall accuracy as a percentage
    pub fn accuracy(&self) -> f64 {
        self.overall.percentage()
    }

    /// Recall over items whose gold label is `label`
    pub fn recall(&self, label: Label) -> f64 {
        self.by_gold_label.metric(label.as_str()).rate()
    }

    /// Unweighted mean of the per-label recalls, as a percentage.
    ///
    /// A label with no gold items contributes a recall of 0.
    pub fn macro_recall(&self) -> f64 {
        let sum: f64 = Label::all().iter().map(|&l| self.recall(l)).sum();
        sum / Label::all().len() as f64 * 100.0
    }
}
