//! Greedy one-to-one matching of ground-truth boxes to predicted boxes.

use nalgebra::DMatrix;

/// Classification of every box in one (image, label) group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupOutcome {
    /// Matched `(truth_idx, pred_idx)` pairs, in the order they were taken.
    pub matches: Vec<(usize, usize)>,

    /// Ground-truth rows left unmatched (false negatives), ascending.
    pub unmatched_truth: Vec<usize>,

    /// Prediction columns left unmatched (false positives), ascending.
    pub unmatched_pred: Vec<usize>,
}

impl GroupOutcome {
    /// Number of ground-truth boxes in the group.
    pub fn num_truth(&self) -> usize {
        self.matches.len() + self.unmatched_truth.len()
    }

    /// Number of predicted boxes in the group.
    pub fn num_pred(&self) -> usize {
        self.matches.len() + self.unmatched_pred.len()
    }

    pub fn true_positives(&self) -> usize {
        self.matches.len()
    }

    pub fn false_positives(&self) -> usize {
        self.unmatched_pred.len()
    }

    pub fn false_negatives(&self) -> usize {
        self.unmatched_truth.len()
    }
}

/// Match ground-truth rows to prediction columns of an IoU matrix.
///
/// Repeatedly takes the largest remaining IoU (the first one in row-major
/// order when several are exactly equal), stops once it falls strictly below
/// `threshold`, and otherwise consumes that row and column. A pair whose IoU
/// equals `threshold` is a match.
///
/// This is greedy, not an optimal assignment: a later pair is never traded
/// for a better total. Confidence scores play no part in the order.
///
/// # Arguments
/// * `iou_matrix` - IoU matrix (n_truth x n_pred)
/// * `threshold` - Minimum IoU for a valid match
pub fn match_group(iou_matrix: &DMatrix<f64>, threshold: f64) -> GroupOutcome {
    let n_truth = iou_matrix.nrows();
    let n_pred = iou_matrix.ncols();

    if n_truth == 0 || n_pred == 0 {
        return GroupOutcome {
            matches: Vec::new(),
            unmatched_truth: (0..n_truth).collect(),
            unmatched_pred: (0..n_pred).collect(),
        };
    }

    // Candidates in row-major order; the stable sort keeps that order among
    // equal IoUs, which is the tie-break of a row-major arg-max scan.
    // `total_cmp` orders -0.0 below 0.0, so zeros are normalized first.
    let mut candidates: Vec<(f64, usize, usize)> = Vec::with_capacity(n_truth * n_pred);
    for i in 0..n_truth {
        for j in 0..n_pred {
            let iou = iou_matrix[(i, j)] + 0.0;
            if iou >= threshold {
                candidates.push((iou, i, j));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut used_truth = vec![false; n_truth];
    let mut used_pred = vec![false; n_pred];
    let mut matches = Vec::new();

    for (_iou, truth_idx, pred_idx) in candidates {
        if used_truth[truth_idx] || used_pred[pred_idx] {
            continue;
        }

        matches.push((truth_idx, pred_idx));
        used_truth[truth_idx] = true;
        used_pred[pred_idx] = true;

        if matches.len() == n_truth.min(n_pred) {
            break;
        }
    }

    GroupOutcome {
        matches,
        unmatched_truth: get_unmatched(&used_truth),
        unmatched_pred: get_unmatched(&used_pred),
    }
}

/// Indices whose consumed marker is still unset.
pub fn get_unmatched(used: &[bool]) -> Vec<usize> {
    used.iter()
        .enumerate()
        .filter(|&(_, &is_used)| !is_used)
        .map(|(idx, _)| idx)
        .collect()
}
