use std::path::PathBuf;

/// An error type for the benchmark harness.
#[derive(thiserror::Error, Debug)]
pub enum FeatBenchError {
    /// The algorithm identifier is unknown or cannot be run by the backend.
    #[error("Unsupported {stage} algorithm: {name}")]
    UnsupportedAlgorithm {
        /// The pipeline stage that rejected the identifier.
        stage: &'static str,
        /// The offending identifier.
        name: String,
    },

    /// The image could not be read or decoded to a non-empty image.
    #[error("Failed to load image: {0}")]
    ImageLoad(PathBuf),

    /// The image sequence configuration yields no images.
    #[error("Image sequence is empty: start index {start} is after end index {end}")]
    EmptyImageSequence {
        /// First image index.
        start: usize,
        /// Last image index.
        end: usize,
    },

    /// The image index is outside the statistics table.
    #[error("Image index {index} out of range for {len} images")]
    InvalidImageIndex {
        /// Requested index.
        index: usize,
        /// Number of images in the sequence.
        len: usize,
    },

    /// The combination index is outside the statistics table.
    #[error("Combination index {index} out of range for {len} combinations")]
    InvalidCombinationIndex {
        /// Requested index.
        index: usize,
        /// Number of combinations in the sweep.
        len: usize,
    },

    /// Error reading or writing a file.
    #[error("Failed to manipulate the file. {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing the configuration file.
    #[error("Failed to parse the configuration. {0}")]
    Config(#[from] serde_json::Error),

    /// Error reported by the vision backend.
    #[error("Vision backend error. {0}")]
    Backend(String),
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for FeatBenchError {
    fn from(e: opencv::Error) -> Self {
        FeatBenchError::Backend(e.to_string())
    }
}
