//! Pairwise IoU (Intersection over Union) between two sets of boxes.

use nalgebra::{DMatrix, DVector, DVectorView};

use crate::detection::{boxes_to_matrix, validate_box_matrix, BoundingBox};
use crate::Result;

/// Floor applied to the union area so that two zero-area boxes give 0 instead of NaN.
pub const UNION_EPSILON: f64 = 1e-32;

/// IoU of a single pair of boxes.
///
/// This is the scalar definition; [`iou_matrix`] computes the same value for
/// every pair at once.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let inter_w = (a.right.min(b.right) - a.left.max(b.left)).max(0.0);
    let inter_h = (a.bottom.min(b.bottom) - a.top.max(b.top)).max(0.0);
    let inter_area = inter_w * inter_h;
    let union_area = (a.area() + b.area() - inter_area).max(UNION_EPSILON);
    // `+ 0.0` turns a -0.0 overlap into 0.0 so zero IoUs compare equal.
    (inter_area / union_area).clamp(0.0, 1.0) + 0.0
}

/// Compute the IoU matrix between two box lists.
///
/// Returns an `(a.len(), b.len())` matrix where entry `(i, j)` is
/// `iou(&a[i], &b[j])`.
pub fn compute_iou(boxes_a: &[BoundingBox], boxes_b: &[BoundingBox]) -> DMatrix<f64> {
    iou_kernel(&boxes_to_matrix(boxes_a), &boxes_to_matrix(boxes_b))
}

/// Compute the IoU matrix between two box matrices.
///
/// # Arguments
/// * `boxes_a` - First set of boxes, shape (m, 4), format [left, top, right, bottom]
/// * `boxes_b` - Second set of boxes, shape (n, 4), same format
///
/// # Returns
/// IoU matrix of shape (m, n) with values in [0, 1]. Either side being empty
/// gives an empty matrix of the matching shape.
pub fn iou_matrix(boxes_a: &DMatrix<f64>, boxes_b: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    validate_box_matrix(boxes_a)?;
    validate_box_matrix(boxes_b)?;
    Ok(iou_kernel(boxes_a, boxes_b))
}

fn iou_kernel(boxes_a: &DMatrix<f64>, boxes_b: &DMatrix<f64>) -> DMatrix<f64> {
    let m = boxes_a.nrows();
    let n = boxes_b.nrows();

    if m == 0 || n == 0 {
        return DMatrix::zeros(m, n);
    }

    // Column k of a box matrix broadcast to (m, n): down the rows for `a`,
    // across the columns for `b`.
    let rows_of = |k: usize| broadcast_down(boxes_a.column(k), n);
    let cols_of = |k: usize| broadcast_across(boxes_b.column(k), m);

    let left = rows_of(0).zip_map(&cols_of(0), f64::max);
    let top = rows_of(1).zip_map(&cols_of(1), f64::max);
    let right = rows_of(2).zip_map(&cols_of(2), f64::min);
    let bottom = rows_of(3).zip_map(&cols_of(3), f64::min);

    let inter_w = right.zip_map(&left, |r, l| (r - l).max(0.0));
    let inter_h = bottom.zip_map(&top, |b, t| (b - t).max(0.0));
    let inter_area = inter_w.component_mul(&inter_h);

    let area_a = areas(boxes_a);
    let area_b = areas(boxes_b);
    let union_area = broadcast_down(area_a.column(0), n) + broadcast_across(area_b.column(0), m)
        - &inter_area;

    inter_area.zip_map(&union_area, |inter, union| {
        (inter / union.max(UNION_EPSILON)).clamp(0.0, 1.0) + 0.0
    })
}

/// Signed area of each row of an (n, 4) box matrix.
fn areas(boxes: &DMatrix<f64>) -> DVector<f64> {
    let widths = boxes.column(2) - boxes.column(0);
    let heights = boxes.column(3) - boxes.column(1);
    widths.component_mul(&heights)
}

/// Repeat a length-m column `n` times: result[(i, j)] = v[i].
fn broadcast_down(v: DVectorView<f64>, n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(v.len(), n, |i, _| v[i])
}

/// Repeat a length-n column as `m` rows: result[(i, j)] = v[j].
fn broadcast_across(v: DVectorView<f64>, m: usize) -> DMatrix<f64> {
    DMatrix::from_fn(m, v.len(), |_, j| v[j])
}
