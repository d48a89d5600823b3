//! Bounding boxes and detection records.

use crate::{Error, Result};
use nalgebra::DMatrix;

/// Number of coordinates per box row: `[left, top, right, bottom]`.
pub const BOX_COLUMNS: usize = 4;

/// An axis-aligned bounding box in `(left, top, right, bottom)` form.
///
/// Coordinates may be absolute pixels or normalized values. Boxes with
/// `right <= left` or `bottom <= top` are degenerate: they are accepted
/// everywhere and simply have zero area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Signed area. Negative for inverted boxes, matching the raw
    /// `(right - left) * (bottom - top)` product used by the IoU kernel.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// True when the box has no positive extent on either axis.
    pub fn is_degenerate(&self) -> bool {
        !(self.right > self.left && self.bottom > self.top)
    }

    pub fn to_array(&self) -> [f64; BOX_COLUMNS] {
        [self.left, self.top, self.right, self.bottom]
    }
}

impl From<[f64; BOX_COLUMNS]> for BoundingBox {
    fn from(coords: [f64; BOX_COLUMNS]) -> Self {
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }
}

/// Stack boxes into an `(n, 4)` matrix, one box per row.
pub fn boxes_to_matrix(boxes: &[BoundingBox]) -> DMatrix<f64> {
    DMatrix::from_fn(boxes.len(), BOX_COLUMNS, |i, j| boxes[i].to_array()[j])
}

/// Read an `(n, 4)` matrix back into boxes.
pub fn matrix_to_boxes(matrix: &DMatrix<f64>) -> Result<Vec<BoundingBox>> {
    validate_box_matrix(matrix)?;
    Ok(matrix
        .row_iter()
        .map(|row| BoundingBox::new(row[0], row[1], row[2], row[3]))
        .collect())
}

/// Validate that a box matrix has exactly four columns.
pub fn validate_box_matrix(matrix: &DMatrix<f64>) -> Result<()> {
    if matrix.ncols() != BOX_COLUMNS {
        return Err(Error::InvalidBoxes {
            expected: format!("(n, {})", BOX_COLUMNS),
            got: format!("({}, {})", matrix.nrows(), matrix.ncols()),
        });
    }
    Ok(())
}

/// A single labelled box on an image, either ground truth or a prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Image the box belongs to.
    pub image_name: String,

    /// Box coordinates.
    pub bbox: BoundingBox,

    /// Class label.
    pub label: String,

    /// Confidence in [0, 1]. Ground truth uses 1.0. Not used for matching.
    pub score: f64,
}

impl Detection {
    /// Create a predicted detection.
    pub fn new(
        image_name: impl Into<String>,
        bbox: BoundingBox,
        label: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            image_name: image_name.into(),
            bbox,
            label: label.into(),
            score,
        }
    }

    /// Create a ground-truth detection (score 1.0).
    pub fn ground_truth(
        image_name: impl Into<String>,
        bbox: BoundingBox,
        label: impl Into<String>,
    ) -> Self {
        Self::new(image_name, bbox, label, 1.0)
    }
}
