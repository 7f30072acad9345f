use crate::{error::FeatBenchError, registry::Combination};

/// Counts and timings recorded for one image of the sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Keypoints returned by the detector.
    pub total_keypoints: usize,
    /// Keypoints left after the region filter.
    pub keypoints_in_region: usize,
    /// Matches accepted against the previous image.
    pub matched_keypoints: usize,
    /// Detection time in milliseconds.
    pub detect_ms: f64,
    /// Description time in milliseconds.
    pub describe_ms: f64,
    /// Matching time in milliseconds.
    pub match_ms: f64,
}

/// A single value to store in a [`FrameStats`] slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Measurement {
    /// Keypoints returned by the detector.
    TotalKeypoints(usize),
    /// Keypoints left after the region filter.
    KeypointsInRegion(usize),
    /// Matches accepted against the previous image.
    MatchedKeypoints(usize),
    /// Detection time in milliseconds.
    DetectTime(f64),
    /// Description time in milliseconds.
    DescribeTime(f64),
    /// Matching time in milliseconds.
    MatchTime(f64),
}

impl FrameStats {
    /// Store a measurement in the matching field.
    pub fn apply(&mut self, measurement: Measurement) {
        match measurement {
            Measurement::TotalKeypoints(v) => self.total_keypoints = v,
            Measurement::KeypointsInRegion(v) => self.keypoints_in_region = v,
            Measurement::MatchedKeypoints(v) => self.matched_keypoints = v,
            Measurement::DetectTime(v) => self.detect_ms = v,
            Measurement::DescribeTime(v) => self.describe_ms = v,
            Measurement::MatchTime(v) => self.match_ms = v,
        }
    }
}

/// Per image statistics of one combination.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinationStats {
    combination: Combination,
    frames: Vec<FrameStats>,
}

impl CombinationStats {
    /// Create zeroed statistics for a sequence of `num_images` images.
    pub fn new(combination: Combination, num_images: usize) -> Self {
        Self {
            combination,
            frames: vec![FrameStats::default(); num_images],
        }
    }

    /// The combination the statistics belong to.
    pub fn combination(&self) -> &Combination {
        &self.combination
    }

    /// One slot per image, in sequence order.
    pub fn frames(&self) -> &[FrameStats] {
        &self.frames
    }

    /// Store a measurement for the image at `image_index`.
    pub fn record(
        &mut self,
        image_index: usize,
        measurement: Measurement,
    ) -> Result<(), FeatBenchError> {
        let len = self.frames.len();
        let frame = self
            .frames
            .get_mut(image_index)
            .ok_or(FeatBenchError::InvalidImageIndex {
                index: image_index,
                len,
            })?;
        frame.apply(measurement);
        Ok(())
    }
}

/// Records the statistics of every combination of a sweep.
///
/// The aggregator only stores values; it derives nothing from them.
#[derive(Clone, Debug, Default)]
pub struct StatsAggregator {
    stats: Vec<CombinationStats>,
}

impl StatsAggregator {
    /// Create zeroed statistics for the combinations.
    pub fn new(combinations: &[Combination], num_images: usize) -> Self {
        Self {
            stats: combinations
                .iter()
                .map(|c| CombinationStats::new(*c, num_images))
                .collect(),
        }
    }

    /// Store a measurement for a combination and image.
    pub fn record(
        &mut self,
        combination_index: usize,
        image_index: usize,
        measurement: Measurement,
    ) -> Result<(), FeatBenchError> {
        let len = self.stats.len();
        self.stats
            .get_mut(combination_index)
            .ok_or(FeatBenchError::InvalidCombinationIndex {
                index: combination_index,
                len,
            })?
            .record(image_index, measurement)
    }

    /// Statistics in registry order.
    pub fn stats(&self) -> &[CombinationStats] {
        &self.stats
    }

    /// Consume the aggregator and return the statistics.
    pub fn into_stats(self) -> Vec<CombinationStats> {
        self.stats
    }
}
