//! Per-label metrics accumulator.

use std::collections::HashMap;

use serde::Serialize;

use crate::matching::GroupOutcome;

/// Running totals for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    /// Ground-truth boxes seen for this label.
    pub total_true: usize,
    /// Predicted boxes seen for this label.
    pub total_pred: usize,
}

impl ClassCounts {
    /// Counts contributed by a single matched group.
    pub fn from_outcome(outcome: &GroupOutcome) -> Self {
        Self {
            true_positive: outcome.true_positives(),
            false_positive: outcome.false_positives(),
            false_negative: outcome.false_negatives(),
            total_true: outcome.num_truth(),
            total_pred: outcome.num_pred(),
        }
    }

    /// Add another set of counts into this one.
    pub fn add(&mut self, other: &ClassCounts) {
        self.true_positive += other.true_positive;
        self.false_positive += other.false_positive;
        self.false_negative += other.false_negative;
        self.total_true += other.total_true;
        self.total_pred += other.total_pred;
    }

    /// Compute precision, recall and F1.
    ///
    /// Any zero denominator yields 0.0, so a label without predictions has
    /// precision 0, a label without ground truth has recall 0, and F1 is 0
    /// whenever precision + recall is 0.
    pub fn finalize(&self) -> ClassMetrics {
        let tp = self.true_positive;

        let precision = if tp + self.false_positive > 0 {
            tp as f64 / (tp + self.false_positive) as f64
        } else {
            0.0
        };

        let recall = if tp + self.false_negative > 0 {
            tp as f64 / (tp + self.false_negative) as f64
        } else {
            0.0
        };

        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassMetrics {
            precision,
            recall,
            f1,
        }
    }
}

/// Final metrics for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// One row of the final table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReport {
    pub label: String,
    #[serde(flatten)]
    pub metrics: ClassMetrics,
    #[serde(flatten)]
    pub counts: ClassCounts,
}

/// Accumulator for per-label detection counts.
///
/// Labels keep the order in which they were first registered or folded.
/// Folding and merging are plain integer additions, so accumulators built
/// over disjoint sets of groups can be merged in any order.
#[derive(Debug, Default, Clone)]
pub struct MetricsAccumulator {
    /// Labels in first-seen order.
    labels: Vec<String>,

    /// Label to position in `labels` / `counts`.
    index: HashMap<String, usize>,

    counts: Vec<ClassCounts>,
}

impl MetricsAccumulator {
    /// Create a new accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `label` has a row, appending it with zero counts if unseen.
    pub fn register_label(&mut self, label: &str) -> &mut ClassCounts {
        let idx = match self.index.get(label) {
            Some(&idx) => idx,
            None => {
                let idx = self.labels.len();
                self.labels.push(label.to_string());
                self.index.insert(label.to_string(), idx);
                self.counts.push(ClassCounts::default());
                idx
            }
        };
        &mut self.counts[idx]
    }

    /// Add a matched group's counts to `label`.
    pub fn fold(&mut self, label: &str, outcome: &GroupOutcome) {
        self.fold_counts(label, &ClassCounts::from_outcome(outcome));
    }

    /// Add raw counts to `label`.
    pub fn fold_counts(&mut self, label: &str, counts: &ClassCounts) {
        self.register_label(label).add(counts);
    }

    /// Merge another accumulator into this one.
    ///
    /// Labels new to `self` are appended in `other`'s order.
    pub fn merge(&mut self, other: &MetricsAccumulator) {
        for (label, counts) in other.iter() {
            self.fold_counts(label, counts);
        }
    }

    /// Counts for a label, if it has been seen.
    pub fn get(&self, label: &str) -> Option<&ClassCounts> {
        self.index.get(label).map(|&idx| &self.counts[idx])
    }

    /// Labels in first-seen order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Iterate `(label, counts)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClassCounts)> {
        self.labels.iter().map(String::as_str).zip(self.counts.iter())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sum of counts over all labels.
    pub fn total(&self) -> ClassCounts {
        let mut total = ClassCounts::default();
        for counts in &self.counts {
            total.add(counts);
        }
        total
    }

    /// Finalize every label into a report row, in first-seen order.
    pub fn finalize(&self) -> Vec<ClassReport> {
        self.iter()
            .map(|(label, counts)| ClassReport {
                label: label.to_string(),
                metrics: counts.finalize(),
                counts: *counts,
            })
            .collect()
    }
}
