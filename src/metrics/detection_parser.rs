//! Parser for ground-truth and detection result files.

use crate::detection::{BoundingBox, Detection};
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Which of the two input files a parser reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `image_name left,top,right,bottom label`
    GroundTruth,
    /// `image_name left,top,right,bottom label score`
    Prediction,
}

impl RecordKind {
    fn num_fields(self) -> usize {
        match self {
            RecordKind::GroundTruth => 3,
            RecordKind::Prediction => 4,
        }
    }
}

/// Parser for whitespace-separated detection files.
///
/// Each non-empty line holds one box:
///
/// ```text
/// 0001.jpg 10,20,110,220 apple          # ground truth
/// 0001.jpg 12,18,105,230 apple 0.87     # detection results
/// ```
///
/// Blank lines are skipped. Anything else that does not parse aborts with
/// [`Error::MalformedRecord`]; no record is ever dropped silently.
#[derive(Debug, Clone)]
pub struct DetectionFileParser {
    path: PathBuf,
    kind: RecordKind,
}

impl DetectionFileParser {
    /// Create a parser for the given file.
    pub fn new<P: AsRef<Path>>(file_path: P, kind: RecordKind) -> Self {
        Self {
            path: file_path.as_ref().to_path_buf(),
            kind,
        }
    }

    /// Parser for a ground-truth file.
    pub fn ground_truth<P: AsRef<Path>>(file_path: P) -> Self {
        Self::new(file_path, RecordKind::GroundTruth)
    }

    /// Parser for a detection results file.
    pub fn predictions<P: AsRef<Path>>(file_path: P) -> Self {
        Self::new(file_path, RecordKind::Prediction)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Open and parse the whole file.
    pub fn parse(&self) -> Result<Vec<Detection>> {
        let file = File::open(&self.path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to open detection file '{}': {}", self.path.display(), e),
            ))
        })?;

        let detections = self.parse_reader(BufReader::new(file))?;
        log::info!(
            "loaded {} {} records from {}",
            detections.len(),
            match self.kind {
                RecordKind::GroundTruth => "ground-truth",
                RecordKind::Prediction => "prediction",
            },
            self.path.display()
        );
        Ok(detections)
    }

    /// Parse records from any buffered reader. Errors report `self.path`.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Vec<Detection>> {
        let mut detections = Vec::new();

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(Error::IoError)?;
            if let Some(detection) = self.parse_line(&line, idx + 1)? {
                detections.push(detection);
            }
        }

        Ok(detections)
    }

    /// Parse a single line (1-based `line_number`). Returns `None` for blank
    /// lines.
    pub fn parse_line(&self, line: &str, line_number: usize) -> Result<Option<Detection>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let malformed = |reason: String| Error::MalformedRecord {
            path: self.path.clone(),
            line: line_number,
            reason,
        };

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let expected = self.kind.num_fields();
        if parts.len() != expected {
            return Err(malformed(format!(
                "expected {} fields, got {}",
                expected,
                parts.len()
            )));
        }

        let bbox = parse_box(parts[1]).map_err(malformed)?;
        if bbox.is_degenerate() {
            log::warn!(
                "{}:{}: degenerate box {:?}",
                self.path.display(),
                line_number,
                bbox
            );
        }

        let score = match self.kind {
            RecordKind::GroundTruth => 1.0,
            RecordKind::Prediction => {
                let score = parse_number(parts[3], "score").map_err(malformed)?;
                if !(0.0..=1.0).contains(&score) {
                    log::warn!(
                        "{}:{}: score {} outside [0, 1]",
                        self.path.display(),
                        line_number,
                        score
                    );
                }
                score
            }
        };

        Ok(Some(Detection::new(parts[0], bbox, parts[2], score)))
    }
}

/// Parse `left,top,right,bottom`.
fn parse_box(field: &str) -> std::result::Result<BoundingBox, String> {
    let coords: Vec<&str> = field.split(',').collect();
    if coords.len() != 4 {
        return Err(format!(
            "expected 4 comma-separated coordinates, got {} in '{}'",
            coords.len(),
            field
        ));
    }

    let names = ["left", "top", "right", "bottom"];
    let mut values = [0.0; 4];
    for (k, (raw, name)) in coords.iter().zip(names).enumerate() {
        values[k] = parse_number(raw, name)?;
    }
    Ok(BoundingBox::from(values))
}

fn parse_number(raw: &str, name: &str) -> std::result::Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{} '{}' is not a number", name, raw))?;
    if !value.is_finite() {
        return Err(format!("{} '{}' is not finite", name, raw));
    }
    Ok(value)
}
