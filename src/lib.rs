//! # detection_eval - Object Detection Evaluation
//!
//! Scores object-detection predictions against ground-truth annotations.
//!
//! Boxes are grouped by `(image, label)`. Within each group the pairwise IoU
//! matrix is computed and boxes are matched one-to-one by greedy highest-IoU
//! matching. Matched pairs are true positives, leftover ground truth are false
//! negatives and leftover predictions are false positives. Counts are summed
//! per label and turned into precision, recall and F1.
//!
//! ## Example
//!
//! ```rust
//! use detection_eval::{evaluate, BoundingBox, Detection, EvaluationConfig};
//!
//! let truth = vec![Detection::ground_truth("img.jpg", BoundingBox::new(0.0, 0.0, 10.0, 10.0), "apple")];
//! let preds = vec![Detection::new("img.jpg", BoundingBox::new(0.0, 0.0, 10.0, 10.0), "apple", 0.9)];
//!
//! let report = evaluate(&truth, &preds, &EvaluationConfig::default()).unwrap();
//! assert_eq!(report.classes[0].metrics.f1, 1.0);
//! ```

pub mod detection;
pub mod iou;
pub mod matching;
pub mod metrics;

// Re-exports for convenience
pub use detection::{BoundingBox, Detection};
pub use iou::{compute_iou, iou, iou_matrix};
pub use matching::{match_group, GroupOutcome};
pub use metrics::{
    evaluate, ClassCounts, ClassMetrics, ClassReport, DetectionFileParser, EvaluationConfig,
    EvaluationReport, MetricsAccumulator, OutputFormat,
};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use std::path::PathBuf;
    use thiserror::Error;

    /// Errors that can occur while evaluating detections
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid box matrix: expected shape {expected}, got {got}")]
        InvalidBoxes { expected: String, got: String },

        #[error("Malformed record at {}:{line}: {reason}", path.display())]
        MalformedRecord {
            path: PathBuf,
            line: usize,
            reason: String,
        },

        #[error(transparent)]
        IoError(#[from] std::io::Error),

        #[error(transparent)]
        JsonError(#[from] serde_json::Error),
    }

    /// Result type for detection_eval operations
    pub type Result<T> = std::result::Result<T, Error>;
}
