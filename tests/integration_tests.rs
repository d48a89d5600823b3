//! Integration tests for detection_eval.
//!
//! These tests run complete evaluations from records or files to the
//! rendered table.

use std::io::Write;

use approx::assert_relative_eq;
use tempfile::NamedTempFile;

use detection_eval::metrics::write_report;
use detection_eval::{
    compute_iou, evaluate, match_group, BoundingBox, Detection, DetectionFileParser,
    EvaluationConfig, OutputFormat,
};

fn gt(image: &str, b: [f64; 4], label: &str) -> Detection {
    Detection::ground_truth(image, BoundingBox::from(b), label)
}

fn pred(image: &str, b: [f64; 4], label: &str, score: f64) -> Detection {
    Detection::new(image, BoundingBox::from(b), label, score)
}

fn config(threshold: f64) -> EvaluationConfig {
    EvaluationConfig::new(threshold).expect("valid threshold")
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[test]
fn test_identical_boxes_are_a_perfect_match() {
    let truth = vec![gt("img", [0.0, 0.0, 10.0, 10.0], "apple")];
    let preds = vec![pred("img", [0.0, 0.0, 10.0, 10.0], "apple", 0.9)];

    let report = evaluate(&truth, &preds, &config(0.5)).unwrap();
    let apple = report.get("apple").unwrap();

    assert_eq!(apple.counts.true_positive, 1);
    assert_eq!(apple.metrics.precision, 1.0);
    assert_eq!(apple.metrics.recall, 1.0);
    assert_eq!(apple.metrics.f1, 1.0);
}

#[test]
fn test_missing_prediction_is_a_false_negative() {
    let truth = vec![gt("img", [0.0, 0.0, 10.0, 10.0], "apple")];

    let report = evaluate(&truth, &[], &config(0.5)).unwrap();
    let apple = report.get("apple").unwrap();

    assert_eq!(apple.counts.true_positive, 0);
    assert_eq!(apple.counts.false_negative, 1);
    assert_eq!(apple.counts.false_positive, 0);
    assert_eq!(apple.metrics.precision, 0.0);
    assert_eq!(apple.metrics.recall, 0.0);
    assert_eq!(apple.metrics.f1, 0.0);
}

#[test]
fn test_disjoint_boxes_give_false_negative_and_false_positive() {
    let truth = vec![gt("img", [0.0, 0.0, 10.0, 10.0], "apple")];
    let preds = vec![pred("img", [20.0, 20.0, 30.0, 30.0], "apple", 0.9)];

    let iou = compute_iou(&[truth[0].bbox], &[preds[0].bbox]);
    assert_eq!(iou[(0, 0)], 0.0);

    let report = evaluate(&truth, &preds, &config(0.5)).unwrap();
    let apple = report.get("apple").unwrap();
    assert_eq!(apple.counts.true_positive, 0);
    assert_eq!(apple.counts.false_negative, 1);
    assert_eq!(apple.counts.false_positive, 1);
}

#[test]
fn test_higher_iou_truth_wins_regardless_of_score() {
    // Both truths overlap the single prediction above threshold; the second
    // one overlaps more and takes the match.
    let truth = vec![
        gt("img", [0.0, 0.0, 10.0, 12.0], "apple"),
        gt("img", [0.0, 0.0, 10.0, 10.0], "apple"),
    ];
    let preds = vec![pred("img", [0.0, 0.0, 10.0, 10.0], "apple", 0.1)];

    let iou = compute_iou(&[truth[0].bbox, truth[1].bbox], &[preds[0].bbox]);
    assert!(iou[(0, 0)] >= 0.5);
    assert!(iou[(1, 0)] > iou[(0, 0)]);

    let outcome = match_group(&iou, 0.5);
    assert_eq!(outcome.matches, vec![(1, 0)]);
    assert_eq!(outcome.unmatched_truth, vec![0]);

    let report = evaluate(&truth, &preds, &config(0.5)).unwrap();
    let apple = report.get("apple").unwrap();
    assert_eq!(apple.counts.true_positive, 1);
    assert_eq!(apple.counts.false_negative, 1);
    assert_eq!(apple.counts.false_positive, 0);
}

#[test]
fn test_low_score_prediction_beats_high_score_prediction() {
    let truth = vec![gt("img", [0.0, 0.0, 10.0, 10.0], "apple")];
    let preds = vec![
        pred("img", [0.0, 0.0, 10.0, 7.0], "apple", 0.99),
        pred("img", [0.0, 0.0, 10.0, 9.0], "apple", 0.01),
    ];
    let iou = compute_iou(&[truth[0].bbox], &[preds[0].bbox, preds[1].bbox]);
    let outcome = match_group(&iou, 0.5);
    assert_eq!(outcome.matches, vec![(0, 1)]);
    assert_eq!(outcome.unmatched_pred, vec![0]);
}

// =============================================================================
// Threshold boundary
// =============================================================================

#[test]
fn test_threshold_boundary() {
    // IoU of these boxes is exactly 0.5.
    let truth = vec![gt("img", [0.0, 0.0, 10.0, 10.0], "apple")];
    let preds = vec![pred("img", [0.0, 0.0, 10.0, 5.0], "apple", 0.9)];

    let at = evaluate(&truth, &preds, &config(0.5)).unwrap();
    assert_eq!(at.get("apple").unwrap().counts.true_positive, 1);

    let above = evaluate(&truth, &preds, &config(0.5 + 1e-9)).unwrap();
    let apple = above.get("apple").unwrap();
    assert_eq!(apple.counts.true_positive, 0);
    assert_eq!(apple.counts.false_negative, 1);
    assert_eq!(apple.counts.false_positive, 1);
}

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn test_group_count_invariants_and_determinism() {
    let mut truth = Vec::new();
    let mut preds = Vec::new();
    for i in 0..6 {
        let x = (i * 7) as f64;
        truth.push(gt("img", [x, 0.0, x + 10.0, 10.0], "apple"));
        truth.push(gt("img", [x, 0.0, x + 10.0, 10.0], "pear"));
    }
    for i in 0..9 {
        let x = (i * 5) as f64;
        preds.push(pred("img", [x, 1.0, x + 9.0, 11.0], "apple", 0.5));
    }

    let first = evaluate(&truth, &preds, &config(0.3)).unwrap();
    for class in &first.classes {
        let c = &class.counts;
        assert!(c.true_positive <= c.total_true.min(c.total_pred));
        assert_eq!(c.true_positive + c.false_negative, c.total_true);
        assert_eq!(c.true_positive + c.false_positive, c.total_pred);
    }

    for _ in 0..5 {
        assert_eq!(evaluate(&truth, &preds, &config(0.3)).unwrap(), first);
    }
}

// =============================================================================
// Files to rendered table
// =============================================================================

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_end_to_end_from_files() {
    let gt_file = temp_file(
        "0001.jpg 0,0,10,10 apple\n\
         0001.jpg 20,20,30,30 apple\n\
         0001.jpg 50,50,60,60 pear\n\
         0002.jpg 0,0,10,10 apple\n",
    );
    let det_file = temp_file(
        "0001.jpg 0,0,10,10 apple 0.9\n\
         0001.jpg 21,21,30,30 apple 0.8\n\
         0002.jpg 40,40,50,50 apple 0.7\n\
         0002.jpg 0,0,10,10 kiwi 0.6\n",
    );

    let truth = DetectionFileParser::ground_truth(gt_file.path()).parse().unwrap();
    let preds = DetectionFileParser::predictions(det_file.path()).parse().unwrap();
    let report = evaluate(&truth, &preds, &EvaluationConfig::default()).unwrap();

    let labels: Vec<&str> = report.classes.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["apple", "pear", "kiwi"]);

    let apple = report.get("apple").unwrap();
    assert_eq!(apple.counts.true_positive, 2);
    assert_eq!(apple.counts.false_positive, 1);
    assert_eq!(apple.counts.false_negative, 1);
    assert_relative_eq!(apple.metrics.precision, 2.0 / 3.0, epsilon = 1e-12);

    let mut out = Vec::new();
    write_report(&mut out, &report, OutputFormat::Text).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "apple:\n\tPrecision: 0.67\n\tRecall: 0.67\n\tF1 score: 0.67\n\n\
         pear:\n\tPrecision: 0.00\n\tRecall: 0.00\n\tF1 score: 0.00\n\n\
         kiwi:\n\tPrecision: 0.00\n\tRecall: 0.00\n\tF1 score: 0.00\n\n"
    );
}

#[test]
fn test_malformed_file_aborts() {
    let det_file = temp_file("0001.jpg 0,0,10,10 apple 0.9\n0001.jpg 0,0,10 apple 0.8\n");
    let err = DetectionFileParser::predictions(det_file.path())
        .parse()
        .unwrap_err();
    assert!(err.to_string().contains(":2:"), "unexpected message: {}", err);
}
