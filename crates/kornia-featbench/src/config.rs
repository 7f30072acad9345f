use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::FeatBenchError, keypoint::Rect, registry::AlgorithmRegistry, report::ReportMetadata,
};

/// A numbered sequence of image files.
///
/// The file of index `i` is `<base_path><prefix><i zero padded to fill_width><extension>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSequence {
    /// Directory prepended to every file name.
    pub base_path: PathBuf,
    /// File name prefix, may contain sub directories.
    pub prefix: String,
    /// File extension including the dot.
    pub extension: String,
    /// First image index.
    pub start_index: usize,
    /// Last image index, inclusive.
    pub end_index: usize,
    /// Number of digits of the zero padded index.
    pub fill_width: usize,
}

impl Default for ImageSequence {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("../images/"),
            prefix: "KITTI/2011_09_26/image_00/data/000000".to_string(),
            extension: ".png".to_string(),
            start_index: 0,
            end_index: 9,
            fill_width: 4,
        }
    }
}

impl ImageSequence {
    /// Number of images in the sequence.
    pub fn len(&self) -> usize {
        if self.end_index < self.start_index {
            0
        } else {
            self.end_index - self.start_index + 1
        }
    }

    /// Whether the sequence has no image.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of the image at position `image_index` of the sequence.
    pub fn path(&self, image_index: usize) -> PathBuf {
        let file_name = format!(
            "{}{:0width$}{}",
            self.prefix,
            self.start_index + image_index,
            self.extension,
            width = self.fill_width
        );
        self.base_path.join(file_name)
    }

    /// Paths of all images in order.
    pub fn paths(&self) -> Vec<PathBuf> {
        (0..self.len()).map(|i| self.path(i)).collect()
    }
}

/// Where and how the report is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output file path.
    pub path: PathBuf,
    /// Author and date header.
    #[serde(flatten)]
    pub metadata: ReportMetadata,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("../report/featbench.csv"),
            metadata: ReportMetadata::default(),
        }
    }
}

/// The full configuration of a benchmark sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Images to replay for every combination.
    pub images: ImageSequence,
    /// Algorithm lists the combinations are drawn from.
    pub algorithms: AlgorithmRegistry,
    /// Keypoints outside this region are discarded, `None` keeps all.
    pub region: Option<Rect>,
    /// Cap on the keypoints kept per image, `None` for no cap.
    pub max_keypoints: Option<usize>,
    /// Report output.
    pub report: ReportConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            images: ImageSequence::default(),
            algorithms: AlgorithmRegistry::default(),
            region: Some(Rect::new(535, 180, 180, 150)),
            max_keypoints: None,
            report: ReportConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Read a configuration from a JSON file.
    ///
    /// Missing fields take their default value.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FeatBenchError> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config)
    }

    /// Check the configuration can drive a sweep.
    pub fn validate(&self) -> Result<(), FeatBenchError> {
        if self.images.is_empty() {
            return Err(FeatBenchError::EmptyImageSequence {
                start: self.images.start_index,
                end: self.images.end_index,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::DetectorKind;

    #[test]
    fn default_file_names() {
        let images = ImageSequence::default();
        assert_eq!(images.len(), 10);
        assert_eq!(
            images.path(0),
            PathBuf::from("../images/KITTI/2011_09_26/image_00/data/0000000000.png")
        );
        assert_eq!(
            images.path(9),
            PathBuf::from("../images/KITTI/2011_09_26/image_00/data/0000000009.png")
        );
    }

    #[test]
    fn offset_and_padding() {
        let images = ImageSequence {
            base_path: PathBuf::from("data"),
            prefix: "img-".to_string(),
            extension: ".jpg".to_string(),
            start_index: 98,
            end_index: 101,
            fill_width: 3,
        };
        let names: Vec<PathBuf> = images.paths();
        assert_eq!(
            names,
            vec![
                PathBuf::from("data/img-098.jpg"),
                PathBuf::from("data/img-099.jpg"),
                PathBuf::from("data/img-100.jpg"),
                PathBuf::from("data/img-101.jpg"),
            ]
        );
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let config = SweepConfig {
            images: ImageSequence {
                start_index: 5,
                end_index: 4,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.images.is_empty());
        assert!(matches!(
            config.validate(),
            Err(FeatBenchError::EmptyImageSequence { start: 5, end: 4 })
        ));
        assert!(SweepConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() -> Result<(), FeatBenchError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("sweep.json");
        std::fs::write(
            &path,
            r#"{
                "images": { "end_index": 2 },
                "algorithms": { "detectors": ["fast", "Harris"] },
                "region": null,
                "report": { "author": "Jane Doe" }
            }"#,
        )?;

        let config = SweepConfig::from_json_file(&path)?;
        assert_eq!(config.images.len(), 3);
        assert_eq!(config.images.fill_width, 4);
        assert_eq!(
            config.algorithms.detectors,
            vec![DetectorKind::Fast, DetectorKind::Harris]
        );
        assert_eq!(config.algorithms.descriptors.len(), 6);
        assert_eq!(config.region, None);
        assert_eq!(config.report.metadata.author, "Jane Doe");
        assert_eq!(config.report.metadata.date, "unknown");
        assert_eq!(config.report.path, PathBuf::from("../report/featbench.csv"));
        Ok(())
    }

    #[test]
    fn unknown_algorithm_in_json() -> Result<(), FeatBenchError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("sweep.json");
        std::fs::write(&path, r#"{ "algorithms": { "detectors": ["SURF"] } }"#)?;
        assert!(matches!(
            SweepConfig::from_json_file(&path),
            Err(FeatBenchError::Config(_))
        ));
        Ok(())
    }
}
