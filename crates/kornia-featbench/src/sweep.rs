use std::path::Path;

use crate::{
    backend::VisionBackend,
    config::SweepConfig,
    error::FeatBenchError,
    filter,
    pipeline::{Pipeline, PipelineParams},
    registry::Combination,
    report,
    stats::{CombinationStats, Measurement, StatsAggregator},
    window::{Frame, FrameWindow},
};

/// Replays the image sequence for every combination of the registry.
///
/// Combinations and images are processed one after the other on the calling
/// thread. For each image the pipeline detects, filters, describes and, once
/// two frames are available, matches against the previous image.
pub struct Sweep<'a, B: VisionBackend> {
    backend: &'a B,
    pipeline: Pipeline<'a, B>,
    config: SweepConfig,
}

impl<'a, B: VisionBackend> Sweep<'a, B> {
    /// Create a sweep with the default algorithm parameters.
    pub fn new(backend: &'a B, config: SweepConfig) -> Self {
        Self::with_params(backend, config, PipelineParams::default())
    }

    /// Create a sweep with explicit algorithm parameters.
    pub fn with_params(backend: &'a B, config: SweepConfig, params: PipelineParams) -> Self {
        Self {
            backend,
            pipeline: Pipeline::with_params(backend, params),
            config,
        }
    }

    /// The sweep configuration.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// The combinations the sweep runs, in report order.
    pub fn combinations(&self) -> Vec<Combination> {
        self.config.algorithms.combinations()
    }

    /// Run every combination and return their statistics in registry order.
    ///
    /// # Errors
    ///
    /// The first error of any stage aborts the sweep.
    pub fn run(&self) -> Result<Vec<CombinationStats>, FeatBenchError> {
        self.config.validate()?;

        let combinations = self.combinations();
        let paths = self.config.images.paths();
        let mut aggregator = StatsAggregator::new(&combinations, paths.len());
        let mut window = FrameWindow::new();

        for (combination_index, combination) in combinations.iter().enumerate() {
            log::info!(
                "Combination {}/{}: {}",
                combination_index + 1,
                combinations.len(),
                combination
            );

            window.reset();
            for (image_index, path) in paths.iter().enumerate() {
                self.process_image(
                    &mut window,
                    &mut aggregator,
                    combination_index,
                    combination,
                    image_index,
                    path,
                )?;
            }
        }

        Ok(aggregator.into_stats())
    }

    /// Run every combination and write the report.
    pub fn run_and_report(&self) -> Result<Vec<CombinationStats>, FeatBenchError> {
        let stats = self.run()?;
        report::write_report(&self.config.report.path, &self.config.report.metadata, &stats)?;
        Ok(stats)
    }

    fn process_image(
        &self,
        window: &mut FrameWindow<B::Image, B::Descriptors>,
        aggregator: &mut StatsAggregator,
        combination_index: usize,
        combination: &Combination,
        image_index: usize,
        path: &Path,
    ) -> Result<(), FeatBenchError> {
        log::debug!("Loading image {}: {}", image_index, path.display());
        let image = self.backend.load_grayscale(path)?;

        let (keypoints, detected) = self.pipeline.detect(&image, combination.detector)?;
        aggregator.record(
            combination_index,
            image_index,
            Measurement::TotalKeypoints(detected.count),
        )?;
        aggregator.record(
            combination_index,
            image_index,
            Measurement::DetectTime(detected.elapsed_ms),
        )?;

        let mut keypoints = match &self.config.region {
            Some(region) => filter::retain_in_region(&keypoints, region),
            None => keypoints,
        };
        aggregator.record(
            combination_index,
            image_index,
            Measurement::KeypointsInRegion(keypoints.len()),
        )?;

        if let Some(max_keypoints) = self.config.max_keypoints {
            filter::limit_keypoints(&mut keypoints, max_keypoints, combination.detector);
            log::debug!("Keypoints have been limited to {}", max_keypoints);
        }

        let (descriptors, described) =
            self.pipeline
                .describe(&image, &mut keypoints, combination.descriptor)?;
        aggregator.record(
            combination_index,
            image_index,
            Measurement::DescribeTime(described.elapsed_ms),
        )?;

        window.push(Frame::new(image, keypoints, descriptors));

        // the first image of a replay has nothing to match against
        let (matched, match_ms) = match window.pair_mut() {
            Some((previous, current)) => {
                let (matches, result) = self.pipeline.match_descriptors(
                    &previous.descriptors,
                    &current.descriptors,
                    combination.descriptor,
                    combination.matcher,
                    combination.selector,
                )?;
                current.matches = matches;
                (result.count, result.elapsed_ms)
            }
            None => (0, 0.0),
        };
        aggregator.record(
            combination_index,
            image_index,
            Measurement::MatchedKeypoints(matched),
        )?;
        aggregator.record(combination_index, image_index, Measurement::MatchTime(match_ms))?;

        Ok(())
    }
}
