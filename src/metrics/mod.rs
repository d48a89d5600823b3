//! Per-class detection metrics.
//!
//! This module turns parsed detections into per-label precision, recall and
//! F1. It includes:
//!
//! - `DetectionFileParser` - Parse ground-truth and detection result files
//! - `MetricsAccumulator` - Running per-label counts
//! - `evaluate` - Group, match and accumulate a whole run
//! - `write_report` - Render the final table as text or JSON

mod detection_parser;
mod accumulator;
mod evaluation;
mod report;

pub use detection_parser::{DetectionFileParser, RecordKind};
pub use accumulator::{ClassCounts, ClassMetrics, ClassReport, MetricsAccumulator};
pub use evaluation::{evaluate, group_detections, EvaluationConfig, EvaluationReport, Group, GroupKey};
pub use report::{write_report, OutputFormat};
