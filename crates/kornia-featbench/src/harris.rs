//! Harris keypoint extraction from a normalized corner response.
//!
//! The backend computes the Harris response and normalizes it to `[0, 255]`.
//! This module turns that response into keypoints with a pairwise overlap
//! suppression: candidates are visited in row-major order and compared against
//! every keypoint accepted so far.
//!
//! The suppression is quadratic in the number of accepted keypoints. The scan
//! order and the strict greater-than replacement decide which keypoint survives
//! a cluster, so both are kept as is to make reports comparable across runs.

use crate::{error::FeatBenchError, keypoint::KeyPoint};

/// Parameters of the Harris detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HarrisParams {
    /// Neighbourhood size of the structure tensor.
    pub block_size: i32,
    /// Aperture of the Sobel operator.
    pub aperture_size: i32,
    /// Harris free parameter.
    pub k: f64,
    /// Minimum normalized response of a candidate, exclusive.
    pub min_response: i32,
    /// Overlap above which two keypoints compete.
    pub max_overlap: f32,
}

impl Default for HarrisParams {
    fn default() -> Self {
        Self {
            block_size: 2,
            aperture_size: 3,
            k: 0.04,
            min_response: 200,
            max_overlap: 0.0,
        }
    }
}

impl HarrisParams {
    /// Diameter assigned to the extracted keypoints.
    pub fn keypoint_size(&self) -> f32 {
        (self.aperture_size * 2) as f32
    }
}

/// A single channel response image stored in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseMap {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl ResponseMap {
    /// Create a response map from row-major data.
    ///
    /// # Errors
    ///
    /// If the data length does not match `rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, FeatBenchError> {
        if data.len() != rows * cols {
            return Err(FeatBenchError::Backend(format!(
                "Response data length ({}) does not match the image size ({})",
                data.len(),
                rows * cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Response at `(row, col)`, `None` outside the map.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// The raw row-major data.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Extract keypoints from a normalized Harris response.
///
/// Every pixel whose truncated response exceeds `params.min_response` becomes a
/// candidate. Candidates carry the row index as `x` and the column index as
/// `y`, the point layout existing Harris reports were produced with. A
/// candidate overlapping an accepted keypoint replaces the first one it beats
/// strictly and is otherwise discarded; a candidate overlapping nothing is
/// accepted.
pub fn suppress_overlapping(response: &ResponseMap, params: &HarrisParams) -> Vec<KeyPoint> {
    let size = params.keypoint_size();
    let mut keypoints: Vec<KeyPoint> = Vec::new();
    if response.cols() == 0 {
        return keypoints;
    }

    for (row, values) in response.as_slice().chunks_exact(response.cols()).enumerate() {
        for (col, &raw) in values.iter().enumerate() {
            let value = raw as i32;
            if value <= params.min_response {
                continue;
            }

            // row first, see the function docs
            let mut candidate = KeyPoint::new(row as f32, col as f32, size)
                .with_response(value as f32);
            candidate.class_id = 0;

            let mut found_overlap = false;
            for accepted in keypoints.iter_mut() {
                if candidate.overlap(accepted) > params.max_overlap {
                    found_overlap = true;
                    if candidate.response > accepted.response {
                        *accepted = candidate;
                        break;
                    }
                }
            }

            if !found_overlap {
                keypoints.push(candidate);
            }
        }
    }

    keypoints
}
