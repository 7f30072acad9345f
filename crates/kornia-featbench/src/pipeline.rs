use std::time::Instant;

use crate::{
    algorithms::{DescriptorKind, DetectorKind, MatcherKind, SelectorKind},
    backend::{BriskParams, FastParams, ShiTomasiParams, VisionBackend},
    error::FeatBenchError,
    harris::{self, HarrisParams},
    keypoint::{KeyPoint, Match},
    matching::{self, MatchStrategy, DEFAULT_RATIO_THRESHOLD},
};

/// Count and duration of one pipeline stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageResult {
    /// Number of items the stage produced.
    pub count: usize,
    /// Wall time spent in the stage, in milliseconds.
    pub elapsed_ms: f64,
}

impl StageResult {
    /// Create a new stage result.
    pub fn new(count: usize, elapsed_ms: f64) -> Self {
        Self { count, elapsed_ms }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Parameters of every algorithm the pipeline can dispatch to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineParams {
    /// Shi-Tomasi detector parameters.
    pub shi_tomasi: ShiTomasiParams,
    /// Harris detector parameters.
    pub harris: HarrisParams,
    /// FAST detector parameters.
    pub fast: FastParams,
    /// BRISK extractor parameters.
    pub brisk: BriskParams,
    /// Distance ratio of the k-nearest-neighbour selector.
    pub ratio_threshold: f32,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            shi_tomasi: ShiTomasiParams::default(),
            harris: HarrisParams::default(),
            fast: FastParams::default(),
            brisk: BriskParams::default(),
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
        }
    }
}

/// The detect, describe and match stages over a vision backend.
pub struct Pipeline<'a, B: VisionBackend> {
    backend: &'a B,
    params: PipelineParams,
}

impl<'a, B: VisionBackend> Pipeline<'a, B> {
    /// Create a pipeline with the default parameters.
    pub fn new(backend: &'a B) -> Self {
        Self::with_params(backend, PipelineParams::default())
    }

    /// Create a pipeline with explicit parameters.
    pub fn with_params(backend: &'a B, params: PipelineParams) -> Self {
        Self { backend, params }
    }

    /// The pipeline parameters.
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Detect keypoints on a grayscale image.
    pub fn detect(
        &self,
        image: &B::Image,
        detector: DetectorKind,
    ) -> Result<(Vec<KeyPoint>, StageResult), FeatBenchError> {
        let start = Instant::now();
        let keypoints = match detector {
            DetectorKind::ShiTomasi => self
                .backend
                .detect_shi_tomasi(image, &self.params.shi_tomasi)?,
            DetectorKind::Harris => {
                let response = self.backend.harris_response(image, &self.params.harris)?;
                harris::suppress_overlapping(&response, &self.params.harris)
            }
            DetectorKind::Fast
            | DetectorKind::Brisk
            | DetectorKind::Orb
            | DetectorKind::Akaze
            | DetectorKind::Sift => self.backend.detect(image, detector, &self.params.fast)?,
        };
        let result = StageResult::new(keypoints.len(), elapsed_ms(start));

        log::debug!(
            "{} detection with n={} keypoints in {:.3} ms",
            detector,
            result.count,
            result.elapsed_ms
        );

        Ok((keypoints, result))
    }

    /// Compute descriptors for the keypoints.
    ///
    /// The keypoints the backend cannot describe are removed, the stage count
    /// is the number of keypoints left.
    pub fn describe(
        &self,
        image: &B::Image,
        keypoints: &mut Vec<KeyPoint>,
        descriptor: DescriptorKind,
    ) -> Result<(B::Descriptors, StageResult), FeatBenchError> {
        let start = Instant::now();
        let descriptors =
            self.backend
                .describe(image, keypoints, descriptor, &self.params.brisk)?;
        let result = StageResult::new(keypoints.len(), elapsed_ms(start));

        log::debug!(
            "{} descriptor extraction in {:.3} ms",
            descriptor,
            result.elapsed_ms
        );

        Ok((descriptors, result))
    }

    /// Match the source descriptors against the reference descriptors.
    ///
    /// The descriptor family decides the distance: binary descriptors are
    /// compared with the Hamming distance and SIFT with the L2 distance.
    pub fn match_descriptors(
        &self,
        source: &B::Descriptors,
        reference: &B::Descriptors,
        descriptor: DescriptorKind,
        matcher: MatcherKind,
        selector: SelectorKind,
    ) -> Result<(Vec<Match>, StageResult), FeatBenchError> {
        let family = descriptor.family();
        let strategy = MatchStrategy::select(matcher, family);
        if strategy == MatchStrategy::BruteForceL2 {
            log::warn!(
                "{} descriptors belong to {}, brute force matching uses L2 instead of Hamming",
                descriptor,
                family
            );
        }

        let start = Instant::now();
        let matches = match selector {
            SelectorKind::NearestNeighbor => {
                let knn_matches = self.backend.knn_match(source, reference, 1, strategy)?;
                matching::select_nearest(&knn_matches)
            }
            SelectorKind::KNearestNeighbors => {
                let knn_matches = self.backend.knn_match(source, reference, 2, strategy)?;
                matching::ratio_test(&knn_matches, self.params.ratio_threshold)
            }
        };
        let result = StageResult::new(matches.len(), elapsed_ms(start));

        log::debug!(
            "{} {} matching with n={} matches in {:.3} ms",
            matcher,
            selector,
            result.count,
            result.elapsed_ms
        );

        Ok((matches, result))
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, path::Path};

    use super::*;
    use crate::harris::ResponseMap;

    /// Records the calls it receives and serves canned results.
    #[derive(Default)]
    struct RecordingBackend {
        knn_calls: RefCell<Vec<(usize, MatchStrategy)>>,
        knn_result: Vec<Vec<Match>>,
    }

    impl VisionBackend for RecordingBackend {
        type Image = ();
        type Descriptors = usize;

        fn load_grayscale(&self, _path: &Path) -> Result<(), FeatBenchError> {
            Ok(())
        }

        fn detect_shi_tomasi(
            &self,
            _image: &(),
            _params: &ShiTomasiParams,
        ) -> Result<Vec<KeyPoint>, FeatBenchError> {
            Ok(vec![KeyPoint::new(1.0, 2.0, 4.0)])
        }

        fn harris_response(
            &self,
            _image: &(),
            _params: &HarrisParams,
        ) -> Result<ResponseMap, FeatBenchError> {
            ResponseMap::new(2, 3, vec![0.0, 250.0, 0.0, 0.0, 0.0, 10.0])
        }

        fn detect(
            &self,
            _image: &(),
            _detector: DetectorKind,
            _fast: &FastParams,
        ) -> Result<Vec<KeyPoint>, FeatBenchError> {
            Ok(vec![KeyPoint::default(); 3])
        }

        fn describe(
            &self,
            _image: &(),
            keypoints: &mut Vec<KeyPoint>,
            _descriptor: DescriptorKind,
            _brisk: &BriskParams,
        ) -> Result<usize, FeatBenchError> {
            keypoints.pop();
            Ok(keypoints.len())
        }

        fn knn_match(
            &self,
            _source: &usize,
            _reference: &usize,
            k: usize,
            strategy: MatchStrategy,
        ) -> Result<Vec<Vec<Match>>, FeatBenchError> {
            self.knn_calls.borrow_mut().push((k, strategy));
            Ok(self.knn_result.clone())
        }
    }

    #[test]
    fn harris_detection_reads_the_response() -> Result<(), FeatBenchError> {
        let backend = RecordingBackend::default();
        let pipeline = Pipeline::new(&backend);
        let (keypoints, result) = pipeline.detect(&(), DetectorKind::Harris)?;
        assert_eq!(result.count, 1);
        assert_eq!((keypoints[0].x, keypoints[0].y), (0.0, 1.0));
        assert_eq!(keypoints[0].size, 6.0);
        Ok(())
    }

    #[test]
    fn library_detectors_go_through_the_backend() -> Result<(), FeatBenchError> {
        let backend = RecordingBackend::default();
        let pipeline = Pipeline::new(&backend);
        let (_, shi_tomasi) = pipeline.detect(&(), DetectorKind::ShiTomasi)?;
        let (_, orb) = pipeline.detect(&(), DetectorKind::Orb)?;
        assert_eq!(shi_tomasi.count, 1);
        assert_eq!(orb.count, 3);
        Ok(())
    }

    #[test]
    fn describe_counts_the_kept_keypoints() -> Result<(), FeatBenchError> {
        let backend = RecordingBackend::default();
        let pipeline = Pipeline::new(&backend);
        let mut keypoints = vec![KeyPoint::default(); 4];
        let (descriptors, result) =
            pipeline.describe(&(), &mut keypoints, DescriptorKind::Brief)?;
        assert_eq!(descriptors, 3);
        assert_eq!(result.count, 3);
        assert!(result.elapsed_ms >= 0.0);
        Ok(())
    }

    #[test]
    fn selector_decides_neighbour_count() -> Result<(), FeatBenchError> {
        let backend = RecordingBackend {
            knn_result: vec![
                vec![Match::new(0, 0, 1.0), Match::new(0, 1, 2.0)],
                vec![Match::new(1, 1, 9.0), Match::new(1, 0, 10.0)],
            ],
            ..Default::default()
        };
        let pipeline = Pipeline::new(&backend);

        let (nearest, result) = pipeline.match_descriptors(
            &0,
            &0,
            DescriptorKind::Orb,
            MatcherKind::BruteForce,
            SelectorKind::NearestNeighbor,
        )?;
        assert_eq!(nearest.len(), 2);
        assert_eq!(result.count, 2);

        let (filtered, _) = pipeline.match_descriptors(
            &0,
            &0,
            DescriptorKind::Orb,
            MatcherKind::BruteForce,
            SelectorKind::KNearestNeighbors,
        )?;
        assert_eq!(filtered, vec![Match::new(0, 0, 1.0)]);

        assert_eq!(
            *backend.knn_calls.borrow(),
            vec![
                (1, MatchStrategy::BruteForceHamming),
                (2, MatchStrategy::BruteForceHamming)
            ]
        );
        Ok(())
    }

    #[test]
    fn sift_descriptors_use_l2() -> Result<(), FeatBenchError> {
        let backend = RecordingBackend::default();
        let pipeline = Pipeline::new(&backend);
        pipeline.match_descriptors(
            &0,
            &0,
            DescriptorKind::Sift,
            MatcherKind::BruteForce,
            SelectorKind::KNearestNeighbors,
        )?;
        pipeline.match_descriptors(
            &0,
            &0,
            DescriptorKind::Sift,
            MatcherKind::Flann,
            SelectorKind::KNearestNeighbors,
        )?;
        assert_eq!(
            *backend.knn_calls.borrow(),
            vec![(2, MatchStrategy::BruteForceL2), (2, MatchStrategy::Flann)]
        );
        Ok(())
    }
}
