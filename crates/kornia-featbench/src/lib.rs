#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// algorithm identifiers and their string names.
pub mod algorithms;

/// vision library abstraction and its implementations.
pub mod backend;

/// sweep configuration and image sequence naming.
pub mod config;

/// Error types for the benchmark.
pub mod error;

/// region of interest and keypoint count filters.
pub mod filter;

/// Harris keypoint extraction with overlap suppression.
pub mod harris;

/// keypoint, match and rectangle types.
pub mod keypoint;

/// match selection and the distance ratio test.
pub mod matching;

/// timed detect, describe and match stages.
pub mod pipeline;

/// valid algorithm combinations.
pub mod registry;

/// report serialization.
pub mod report;

/// per image statistics recording.
pub mod stats;

/// the benchmark control loop.
pub mod sweep;

/// sliding window over the last two frames.
pub mod window;

pub use crate::error::FeatBenchError;
pub use crate::registry::{AlgorithmRegistry, Combination};
pub use crate::sweep::Sweep;
