use crate::{
    algorithms::{DescriptorFamily, MatcherKind},
    keypoint::Match,
};

/// Distance ratio used by the k-nearest-neighbour selector.
pub const DEFAULT_RATIO_THRESHOLD: f32 = 0.8;

/// The distance and search structure used to pair descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Exhaustive search with the Hamming distance on 8 bit descriptors.
    BruteForceHamming,
    /// Exhaustive search with the L2 distance on 32 bit float descriptors.
    BruteForceL2,
    /// Approximate nearest neighbour index on 32 bit float descriptors.
    Flann,
}

impl MatchStrategy {
    /// Pick the strategy for a matcher and descriptor family.
    ///
    /// Brute force matching of gradient histograms uses the L2 distance; the
    /// Hamming distance is only meaningful on binary descriptors.
    pub fn select(matcher: MatcherKind, family: DescriptorFamily) -> Self {
        match (matcher, family) {
            (MatcherKind::BruteForce, DescriptorFamily::Binary) => MatchStrategy::BruteForceHamming,
            (MatcherKind::BruteForce, DescriptorFamily::Hog) => MatchStrategy::BruteForceL2,
            (MatcherKind::Flann, _) => MatchStrategy::Flann,
        }
    }
}

/// Keep the best neighbour of every source descriptor.
pub fn select_nearest(knn_matches: &[Vec<Match>]) -> Vec<Match> {
    knn_matches
        .iter()
        .filter_map(|neighbours| neighbours.first().copied())
        .collect()
}

/// Lowe's distance ratio test.
///
/// The best neighbour is kept when its distance is strictly below `ratio` times
/// the distance of the second best. A source descriptor with a single
/// neighbour has no competing candidate and is kept.
///
/// # Arguments
///
/// * `knn_matches` - Neighbours of every source descriptor, sorted by distance.
/// * `ratio` - The ratio threshold, `0.8` in the benchmark.
pub fn ratio_test(knn_matches: &[Vec<Match>], ratio: f32) -> Vec<Match> {
    knn_matches
        .iter()
        .filter_map(|neighbours| match neighbours.as_slice() {
            [best, second, ..] => (best.distance < ratio * second.distance).then_some(*best),
            [best] => Some(*best),
            [] => None,
        })
        .collect()
}
