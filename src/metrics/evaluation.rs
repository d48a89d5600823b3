//! Evaluation driver: group, match and accumulate.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{ClassCounts, ClassReport, MetricsAccumulator, OutputFormat};
use crate::detection::{BoundingBox, Detection};
use crate::iou::compute_iou;
use crate::matching::{match_group, GroupOutcome};
use crate::{Error, Result};

/// Default IoU threshold for a match.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;

/// Configuration for one evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    /// Minimum IoU for a ground-truth/prediction pair to count as a match.
    /// Applied to every image and label.
    pub iou_threshold: f64,

    /// How the final table is rendered.
    pub format: OutputFormat,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            format: OutputFormat::Text,
        }
    }
}

impl EvaluationConfig {
    /// Create a validated configuration with the given threshold.
    pub fn new(iou_threshold: f64) -> Result<Self> {
        let config = Self {
            iou_threshold,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the threshold lies in [0, 1].
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(Error::InvalidConfig(format!(
                "iou_threshold must be in [0, 1], got {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }
}

/// Key of a matching group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub image_name: String,
    pub label: String,
}

/// Ground-truth and predicted boxes sharing one [`GroupKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub truth: Vec<BoundingBox>,
    pub pred: Vec<BoundingBox>,
}

impl Group {
    /// Compute the IoU matrix and match the group's boxes.
    pub fn evaluate(&self, iou_threshold: f64) -> GroupOutcome {
        let iou = compute_iou(&self.truth, &self.pred);
        match_group(&iou, iou_threshold)
    }
}

/// Build the `(image, label)` grouping once for a whole run.
///
/// Boxes keep their input order inside each group.
pub fn group_detections(
    ground_truth: &[Detection],
    predictions: &[Detection],
) -> BTreeMap<GroupKey, Group> {
    let mut groups: BTreeMap<GroupKey, Group> = BTreeMap::new();

    let key_of = |d: &Detection| GroupKey {
        image_name: d.image_name.clone(),
        label: d.label.clone(),
    };

    for d in ground_truth {
        groups.entry(key_of(d)).or_default().truth.push(d.bbox);
    }
    for d in predictions {
        groups.entry(key_of(d)).or_default().pred.push(d.bbox);
    }

    groups
}

/// Result of a whole evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// One row per label, in first-seen order (ground truth, then predictions).
    pub classes: Vec<ClassReport>,

    /// Counts summed over all labels.
    pub total: ClassCounts,

    /// Number of `(image, label)` groups evaluated.
    pub num_groups: usize,

    pub iou_threshold: f64,
}

impl EvaluationReport {
    /// Row for a label, if it appeared in either input.
    pub fn get(&self, label: &str) -> Option<&ClassReport> {
        self.classes.iter().find(|c| c.label == label)
    }
}

/// Evaluate predictions against ground truth.
///
/// # Arguments
/// * `ground_truth` - Ground-truth records
/// * `predictions` - Predicted records
/// * `config` - Evaluation configuration (threshold is validated here)
///
/// # Returns
/// Per-label report. Labels seen only in predictions are included (all
/// false positives) and labels seen only in ground truth are included (all
/// false negatives).
pub fn evaluate(
    ground_truth: &[Detection],
    predictions: &[Detection],
    config: &EvaluationConfig,
) -> Result<EvaluationReport> {
    config.validate()?;

    let mut acc = MetricsAccumulator::new();
    for d in ground_truth.iter().chain(predictions) {
        acc.register_label(&d.label);
    }

    let groups = group_detections(ground_truth, predictions);
    for (key, group) in &groups {
        let outcome = group.evaluate(config.iou_threshold);
        log::debug!(
            "{} / {}: {} truth, {} pred -> tp={} fp={} fn={}",
            key.image_name,
            key.label,
            group.truth.len(),
            group.pred.len(),
            outcome.true_positives(),
            outcome.false_positives(),
            outcome.false_negatives()
        );
        acc.fold(&key.label, &outcome);
    }

    let report = EvaluationReport {
        classes: acc.finalize(),
        total: acc.total(),
        num_groups: groups.len(),
        iou_threshold: config.iou_threshold,
    };

    log::info!(
        "evaluated {} groups over {} labels: tp={} fp={} fn={}",
        report.num_groups,
        report.classes.len(),
        report.total.true_positive,
        report.total.false_positive,
        report.total.false_negative
    );

    Ok(report)
}
