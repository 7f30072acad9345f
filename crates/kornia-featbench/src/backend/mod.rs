//! The vision library the pipeline delegates to.
//!
//! The harness owns the control flow, the timing and the bookkeeping. Image
//! decoding, corner responses, feature detection, description and descriptor
//! search are provided by an implementation of [`VisionBackend`].

use std::path::Path;

use crate::{
    algorithms::{DescriptorKind, DetectorKind},
    error::FeatBenchError,
    harris::{HarrisParams, ResponseMap},
    keypoint::{KeyPoint, Match},
    matching::MatchStrategy,
};

#[cfg(feature = "opencv")]
mod cv;

#[cfg(feature = "opencv")]
pub use self::cv::OpenCvBackend;

/// Parameters of the Shi-Tomasi detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShiTomasiParams {
    /// Neighbourhood size of the derivative covariation matrix.
    pub block_size: i32,
    /// Maximum permissible overlap between two corners, in `[0, 1]`.
    pub max_overlap: f64,
    /// Minimal accepted corner quality relative to the best corner.
    pub quality_level: f64,
    /// Harris free parameter, unused by the Shi-Tomasi score.
    pub k: f64,
}

impl Default for ShiTomasiParams {
    fn default() -> Self {
        Self {
            block_size: 4,
            max_overlap: 0.0,
            quality_level: 0.01,
            k: 0.04,
        }
    }
}

impl ShiTomasiParams {
    /// Minimum distance between two returned corners.
    pub fn min_distance(&self) -> f64 {
        (1.0 - self.max_overlap) * self.block_size as f64
    }

    /// Maximum number of corners for an image of the given size.
    pub fn max_corners(&self, rows: usize, cols: usize) -> i32 {
        ((rows * cols) as f64 / self.min_distance().max(1.0)) as i32
    }
}

/// Parameters of the FAST detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FastParams {
    /// Intensity difference threshold of the segment test.
    pub threshold: i32,
    /// Whether to suppress non maximal corners.
    pub nonmax_suppression: bool,
}

impl Default for FastParams {
    fn default() -> Self {
        Self {
            threshold: 30,
            nonmax_suppression: true,
        }
    }
}

/// Parameters of the BRISK descriptor extractor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BriskParams {
    /// FAST/AGAST detection threshold score.
    pub threshold: i32,
    /// Detection octaves, 0 for single scale.
    pub octaves: i32,
    /// Scale applied to the sampling pattern.
    pub pattern_scale: f32,
}

impl Default for BriskParams {
    fn default() -> Self {
        Self {
            threshold: 30,
            octaves: 3,
            pattern_scale: 1.0,
        }
    }
}

/// Operations the benchmark needs from a vision library.
///
/// Every method blocks until the library returns. Timings are measured by the
/// caller around each call.
pub trait VisionBackend {
    /// A single channel 8 bit image.
    type Image;
    /// A descriptor matrix with one row per keypoint.
    type Descriptors;

    /// Read a color image from disk and convert it to grayscale.
    ///
    /// # Errors
    ///
    /// [`FeatBenchError::ImageLoad`] if the file is missing or cannot be decoded.
    fn load_grayscale(&self, path: &Path) -> Result<Self::Image, FeatBenchError>;

    /// Detect Shi-Tomasi corners, strongest first.
    fn detect_shi_tomasi(
        &self,
        image: &Self::Image,
        params: &ShiTomasiParams,
    ) -> Result<Vec<KeyPoint>, FeatBenchError>;

    /// Compute the Harris response normalized to `[0, 255]`.
    fn harris_response(
        &self,
        image: &Self::Image,
        params: &HarrisParams,
    ) -> Result<ResponseMap, FeatBenchError>;

    /// Detect keypoints with a library detector.
    ///
    /// Called for every detector except Shi-Tomasi and Harris.
    fn detect(
        &self,
        image: &Self::Image,
        detector: DetectorKind,
        fast: &FastParams,
    ) -> Result<Vec<KeyPoint>, FeatBenchError>;

    /// Compute descriptors for the keypoints.
    ///
    /// Keypoints the extractor cannot describe are removed from `keypoints` so
    /// the descriptor rows stay aligned with it.
    fn describe(
        &self,
        image: &Self::Image,
        keypoints: &mut Vec<KeyPoint>,
        descriptor: DescriptorKind,
        brisk: &BriskParams,
    ) -> Result<Self::Descriptors, FeatBenchError>;

    /// Find the `k` nearest reference descriptors of every source descriptor.
    ///
    /// The inner vectors are sorted by increasing distance and may hold fewer
    /// than `k` entries.
    fn knn_match(
        &self,
        source: &Self::Descriptors,
        reference: &Self::Descriptors,
        k: usize,
        strategy: MatchStrategy,
    ) -> Result<Vec<Vec<Match>>, FeatBenchError>;
}
