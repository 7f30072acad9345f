use std::path::Path;

use opencv::{
    core::{self, DMatch, KeyPoint as CvKeyPoint, Mat, Point2f, Vector},
    features2d, imgcodecs, imgproc,
    prelude::*,
    xfeatures2d,
};

use super::{BriskParams, FastParams, ShiTomasiParams, VisionBackend};
use crate::{
    algorithms::{DescriptorKind, DetectorKind},
    error::FeatBenchError,
    harris::{HarrisParams, ResponseMap},
    keypoint::{KeyPoint, Match},
    matching::MatchStrategy,
};

/// Vision backend implemented with OpenCV and its contrib modules.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenCvBackend;

impl OpenCvBackend {
    /// Create a new backend.
    pub fn new() -> Self {
        Self
    }
}

fn to_cv_keypoints(keypoints: &[KeyPoint]) -> Result<Vector<CvKeyPoint>, FeatBenchError> {
    keypoints
        .iter()
        .map(|kp| {
            CvKeyPoint::new_coords(
                kp.x,
                kp.y,
                kp.size,
                kp.angle,
                kp.response,
                kp.octave,
                kp.class_id,
            )
            .map_err(FeatBenchError::from)
        })
        .collect()
}

fn from_cv_keypoints(keypoints: &Vector<CvKeyPoint>) -> Vec<KeyPoint> {
    keypoints
        .iter()
        .map(|kp| {
            let pt = kp.pt();
            KeyPoint {
                x: pt.x,
                y: pt.y,
                size: kp.size(),
                angle: kp.angle(),
                response: kp.response(),
                octave: kp.octave(),
                class_id: kp.class_id(),
            }
        })
        .collect()
}

fn run_detector(
    mut detector: impl Feature2DTrait,
    image: &Mat,
) -> Result<Vector<CvKeyPoint>, FeatBenchError> {
    let mut keypoints = Vector::new();
    detector.detect_def(image, &mut keypoints)?;
    Ok(keypoints)
}

fn run_extractor(
    mut extractor: impl Feature2DTrait,
    image: &Mat,
    keypoints: &mut Vector<CvKeyPoint>,
) -> Result<Mat, FeatBenchError> {
    let mut descriptors = Mat::default();
    extractor.compute(image, keypoints, &mut descriptors)?;
    Ok(descriptors)
}

/// Convert the descriptors to the given depth if needed.
fn with_depth(descriptors: &Mat, depth: i32) -> Result<Mat, FeatBenchError> {
    if descriptors.depth() == depth {
        return Ok(descriptors.try_clone()?);
    }
    let mut converted = Mat::default();
    descriptors.convert_to_def(&mut converted, depth)?;
    Ok(converted)
}

impl VisionBackend for OpenCvBackend {
    type Image = Mat;
    type Descriptors = Mat;

    fn load_grayscale(&self, path: &Path) -> Result<Mat, FeatBenchError> {
        let file_name = path
            .to_str()
            .ok_or_else(|| FeatBenchError::ImageLoad(path.to_path_buf()))?;

        let img = imgcodecs::imread(file_name, imgcodecs::IMREAD_COLOR)?;
        if img.empty() {
            return Err(FeatBenchError::ImageLoad(path.to_path_buf()));
        }

        let mut gray = Mat::default();
        imgproc::cvt_color_def(&img, &mut gray, imgproc::COLOR_BGR2GRAY)?;
        Ok(gray)
    }

    fn detect_shi_tomasi(
        &self,
        image: &Mat,
        params: &ShiTomasiParams,
    ) -> Result<Vec<KeyPoint>, FeatBenchError> {
        let max_corners = params.max_corners(image.rows() as usize, image.cols() as usize);

        let mut corners = Vector::<Point2f>::new();
        imgproc::good_features_to_track(
            image,
            &mut corners,
            max_corners,
            params.quality_level,
            params.min_distance(),
            &core::no_array(),
            params.block_size,
            false,
            params.k,
        )?;

        Ok(corners
            .iter()
            .map(|pt| KeyPoint::new(pt.x, pt.y, params.block_size as f32))
            .collect())
    }

    fn harris_response(
        &self,
        image: &Mat,
        params: &HarrisParams,
    ) -> Result<ResponseMap, FeatBenchError> {
        let mut dst = Mat::default();
        imgproc::corner_harris(
            image,
            &mut dst,
            params.block_size,
            params.aperture_size,
            params.k,
            core::BORDER_DEFAULT,
        )?;

        let mut dst_norm = Mat::default();
        core::normalize(
            &dst,
            &mut dst_norm,
            0.0,
            255.0,
            core::NORM_MINMAX,
            core::CV_32FC1,
            &core::no_array(),
        )?;

        let (rows, cols) = (dst_norm.rows() as usize, dst_norm.cols() as usize);
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..dst_norm.rows() {
            data.extend_from_slice(dst_norm.at_row::<f32>(row)?);
        }

        ResponseMap::new(rows, cols, data)
    }

    fn detect(
        &self,
        image: &Mat,
        detector: DetectorKind,
        fast: &FastParams,
    ) -> Result<Vec<KeyPoint>, FeatBenchError> {
        let keypoints = match detector {
            DetectorKind::Fast => run_detector(
                features2d::FastFeatureDetector::create(
                    fast.threshold,
                    fast.nonmax_suppression,
                    features2d::FastFeatureDetector_DetectorType::TYPE_9_16,
                )?,
                image,
            )?,
            DetectorKind::Brisk => run_detector(features2d::BRISK::create_def()?, image)?,
            DetectorKind::Orb => run_detector(features2d::ORB::create_def()?, image)?,
            DetectorKind::Akaze => run_detector(features2d::AKAZE::create_def()?, image)?,
            DetectorKind::Sift => run_detector(features2d::SIFT::create_def()?, image)?,
            DetectorKind::ShiTomasi | DetectorKind::Harris => {
                return Err(FeatBenchError::UnsupportedAlgorithm {
                    stage: "detector",
                    name: detector.to_string(),
                })
            }
        };

        Ok(from_cv_keypoints(&keypoints))
    }

    fn describe(
        &self,
        image: &Mat,
        keypoints: &mut Vec<KeyPoint>,
        descriptor: DescriptorKind,
        brisk: &BriskParams,
    ) -> Result<Mat, FeatBenchError> {
        let mut cv_keypoints = to_cv_keypoints(keypoints)?;

        let descriptors = match descriptor {
            DescriptorKind::Brisk => run_extractor(
                features2d::BRISK::create(brisk.threshold, brisk.octaves, brisk.pattern_scale)?,
                image,
                &mut cv_keypoints,
            )?,
            DescriptorKind::Orb => {
                run_extractor(features2d::ORB::create_def()?, image, &mut cv_keypoints)?
            }
            DescriptorKind::Freak => {
                run_extractor(xfeatures2d::FREAK::create_def()?, image, &mut cv_keypoints)?
            }
            DescriptorKind::Akaze => {
                run_extractor(features2d::AKAZE::create_def()?, image, &mut cv_keypoints)?
            }
            DescriptorKind::Sift => {
                run_extractor(features2d::SIFT::create_def()?, image, &mut cv_keypoints)?
            }
            DescriptorKind::Brief => run_extractor(
                xfeatures2d::BriefDescriptorExtractor::create_def()?,
                image,
                &mut cv_keypoints,
            )?,
        };

        *keypoints = from_cv_keypoints(&cv_keypoints);
        Ok(descriptors)
    }

    fn knn_match(
        &self,
        source: &Mat,
        reference: &Mat,
        k: usize,
        strategy: MatchStrategy,
    ) -> Result<Vec<Vec<Match>>, FeatBenchError> {
        // the flann index cannot be built from an empty matrix
        if source.empty() || reference.empty() {
            return Ok(vec![Vec::new(); source.rows().max(0) as usize]);
        }

        let depth = match strategy {
            MatchStrategy::BruteForceHamming => core::CV_8U,
            MatchStrategy::BruteForceL2 | MatchStrategy::Flann => core::CV_32F,
        };
        let source = with_depth(source, depth)?;
        let reference = with_depth(reference, depth)?;

        let mut knn_matches = Vector::<Vector<DMatch>>::new();
        match strategy {
            MatchStrategy::BruteForceHamming => {
                let matcher = features2d::BFMatcher::create(core::NORM_HAMMING, false)?;
                matcher.knn_train_match_def(&source, &reference, &mut knn_matches, k as i32)?;
            }
            MatchStrategy::BruteForceL2 => {
                let matcher = features2d::BFMatcher::create(core::NORM_L2, false)?;
                matcher.knn_train_match_def(&source, &reference, &mut knn_matches, k as i32)?;
            }
            MatchStrategy::Flann => {
                let matcher = features2d::FlannBasedMatcher::create()?;
                matcher.knn_train_match_def(&source, &reference, &mut knn_matches, k as i32)?;
            }
        }

        Ok(knn_matches
            .iter()
            .map(|neighbours| {
                neighbours
                    .iter()
                    .map(|m| Match::new(m.query_idx as usize, m.train_idx as usize, m.distance))
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_image(rows: i32, cols: i32) -> Result<Mat, FeatBenchError> {
        Ok(Mat::new_rows_cols_with_default(
            rows,
            cols,
            core::CV_8UC1,
            core::Scalar::all(0.0),
        )?)
    }

    #[test]
    fn keypoints_survive_conversion() -> Result<(), FeatBenchError> {
        let keypoints = vec![
            KeyPoint {
                x: 1.5,
                y: 2.5,
                size: 6.0,
                angle: 30.0,
                response: 0.75,
                octave: 1,
                class_id: 3,
            },
            KeyPoint::new(10.0, 20.0, 4.0),
        ];
        let converted = from_cv_keypoints(&to_cv_keypoints(&keypoints)?);
        assert_eq!(converted, keypoints);
        Ok(())
    }

    #[test]
    fn depth_is_coerced() -> Result<(), FeatBenchError> {
        let bytes = Mat::from_slice_2d::<u8>(&[[0, 200], [17, 255]])?;

        let floats = with_depth(&bytes, core::CV_32F)?;
        assert_eq!(floats.depth(), core::CV_32F);
        assert_eq!(*floats.at_2d::<f32>(0, 1)?, 200.0);
        assert_eq!(*floats.at_2d::<f32>(1, 0)?, 17.0);

        let same = with_depth(&bytes, core::CV_8U)?;
        assert_eq!(same.depth(), core::CV_8U);
        assert_eq!(*same.at_2d::<u8>(1, 1)?, 255);
        Ok(())
    }

    #[test]
    fn empty_descriptors_match_nothing() -> Result<(), FeatBenchError> {
        let backend = OpenCvBackend::new();
        let descriptors = Mat::from_slice_2d::<u8>(&[[1, 2], [3, 4], [5, 6]])?;
        let empty = Mat::default();

        for strategy in [
            MatchStrategy::BruteForceHamming,
            MatchStrategy::BruteForceL2,
            MatchStrategy::Flann,
        ] {
            let no_source = backend.knn_match(&empty, &descriptors, 2, strategy)?;
            assert!(no_source.is_empty());

            let no_reference = backend.knn_match(&descriptors, &empty, 2, strategy)?;
            assert_eq!(no_reference, vec![Vec::<Match>::new(); 3]);
        }
        Ok(())
    }

    #[test]
    fn hamming_knn() -> Result<(), FeatBenchError> {
        let backend = OpenCvBackend::new();
        let source = Mat::from_slice_2d::<u8>(&[[0xF0], [0x0F]])?;
        let reference = Mat::from_slice_2d::<u8>(&[[0xF0], [0xFF]])?;

        let knn = backend.knn_match(&source, &reference, 2, MatchStrategy::BruteForceHamming)?;
        assert_eq!(
            knn,
            vec![
                vec![Match::new(0, 0, 0.0), Match::new(0, 1, 4.0)],
                vec![Match::new(1, 1, 4.0), Match::new(1, 0, 8.0)],
            ]
        );
        Ok(())
    }

    #[test]
    fn l2_knn() -> Result<(), FeatBenchError> {
        let backend = OpenCvBackend::new();
        let source = Mat::from_slice_2d::<f32>(&[[0.0, 0.0], [3.0, 4.0]])?;
        let reference = Mat::from_slice_2d::<f32>(&[[3.0, 4.0], [0.0, 0.0]])?;

        let knn = backend.knn_match(&source, &reference, 2, MatchStrategy::BruteForceL2)?;
        assert_eq!(
            knn,
            vec![
                vec![Match::new(0, 1, 0.0), Match::new(0, 0, 5.0)],
                vec![Match::new(1, 0, 0.0), Match::new(1, 1, 5.0)],
            ]
        );
        Ok(())
    }

    #[test]
    fn flann_accepts_binary_descriptors() -> Result<(), FeatBenchError> {
        let backend = OpenCvBackend::new();
        let source = Mat::from_slice_2d::<u8>(&[[0, 0], [30, 40]])?;
        let reference = Mat::from_slice_2d::<u8>(&[[30, 40], [0, 0]])?;

        let knn = backend.knn_match(&source, &reference, 2, MatchStrategy::Flann)?;
        assert_eq!(knn.len(), 2);
        assert!(knn.iter().all(|neighbours| neighbours.len() == 2));
        assert_eq!((knn[0][0].query_idx, knn[0][0].train_idx), (0, 1));
        assert_eq!((knn[1][0].query_idx, knn[1][0].train_idx), (1, 0));
        assert_eq!(knn[0][0].distance, 0.0);
        Ok(())
    }

    #[test]
    fn describe_drops_border_keypoints() -> Result<(), FeatBenchError> {
        let backend = OpenCvBackend::new();
        let image = gray_image(100, 100)?;
        let mut keypoints = vec![
            KeyPoint::new(2.0, 2.0, 6.0),
            KeyPoint::new(50.0, 50.0, 6.0),
        ];

        let descriptors = backend.describe(
            &image,
            &mut keypoints,
            DescriptorKind::Brief,
            &BriskParams::default(),
        )?;

        assert_eq!(keypoints.len(), 1);
        assert_eq!((keypoints[0].x, keypoints[0].y), (50.0, 50.0));
        assert_eq!(descriptors.rows(), 1);
        assert_eq!(descriptors.depth(), core::CV_8U);
        Ok(())
    }
}
