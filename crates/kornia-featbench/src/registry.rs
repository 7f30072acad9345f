use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algorithms::{DescriptorKind, DetectorKind, MatcherKind, SelectorKind};

/// One entry of the parameter sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Combination {
    /// Keypoint detector.
    pub detector: DetectorKind,
    /// Descriptor extractor.
    pub descriptor: DescriptorKind,
    /// Descriptor matcher.
    pub matcher: MatcherKind,
    /// Match selection strategy.
    pub selector: SelectorKind,
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.detector, self.descriptor, self.matcher, self.selector
        )
    }
}

/// Returns whether the descriptor can be computed on the detector's keypoints.
///
/// AKAZE descriptors need the octave information only the AKAZE detector
/// provides, and ORB cannot describe SIFT keypoints.
pub fn is_valid_pairing(detector: DetectorKind, descriptor: DescriptorKind) -> bool {
    !((descriptor == DescriptorKind::Akaze && detector != DetectorKind::Akaze)
        || (descriptor == DescriptorKind::Orb && detector == DetectorKind::Sift))
}

/// The algorithm lists a sweep is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmRegistry {
    /// Detectors to sweep over.
    pub detectors: Vec<DetectorKind>,
    /// Descriptors to sweep over.
    pub descriptors: Vec<DescriptorKind>,
    /// Matchers to sweep over.
    pub matchers: Vec<MatcherKind>,
    /// Selectors to sweep over.
    pub selectors: Vec<SelectorKind>,
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self {
            detectors: DetectorKind::ALL.to_vec(),
            descriptors: DescriptorKind::ALL.to_vec(),
            matchers: vec![MatcherKind::BruteForce],
            selectors: vec![SelectorKind::KNearestNeighbors],
        }
    }
}

impl AlgorithmRegistry {
    /// Create a registry from explicit lists.
    pub fn new(
        detectors: Vec<DetectorKind>,
        descriptors: Vec<DescriptorKind>,
        matchers: Vec<MatcherKind>,
        selectors: Vec<SelectorKind>,
    ) -> Self {
        Self {
            detectors,
            descriptors,
            matchers,
            selectors,
        }
    }

    /// The valid combinations of the cross product.
    ///
    /// The order is detector outermost, then descriptor, matcher and selector.
    /// Report identifiers are assigned in this order.
    pub fn combinations(&self) -> Vec<Combination> {
        let mut combinations = Vec::new();
        for &detector in &self.detectors {
            for &descriptor in &self.descriptors {
                if !is_valid_pairing(detector, descriptor) {
                    continue;
                }
                for &matcher in &self.matchers {
                    for &selector in &self.selectors {
                        combinations.push(Combination {
                            detector,
                            descriptor,
                            matcher,
                            selector,
                        });
                    }
                }
            }
        }
        combinations
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn default_registry_has_35_combinations() {
        let combinations = AlgorithmRegistry::default().combinations();
        assert_eq!(combinations.len(), 35);

        let unique: HashSet<_> = combinations.iter().collect();
        assert_eq!(unique.len(), 35);
    }

    #[test]
    fn akaze_descriptor_needs_akaze_detector() {
        for combination in AlgorithmRegistry::default().combinations() {
            if combination.descriptor == DescriptorKind::Akaze {
                assert_eq!(combination.detector, DetectorKind::Akaze);
            }
            assert!(
                !(combination.descriptor == DescriptorKind::Orb
                    && combination.detector == DetectorKind::Sift)
            );
        }
        assert!(is_valid_pairing(DetectorKind::Akaze, DescriptorKind::Akaze));
        assert!(!is_valid_pairing(DetectorKind::Fast, DescriptorKind::Akaze));
        assert!(!is_valid_pairing(DetectorKind::Sift, DescriptorKind::Orb));
        assert!(is_valid_pairing(DetectorKind::Sift, DescriptorKind::Sift));
    }

    #[test]
    fn iteration_order() {
        let registry = AlgorithmRegistry::new(
            vec![DetectorKind::Fast, DetectorKind::Orb],
            vec![DescriptorKind::Brief, DescriptorKind::Orb],
            vec![MatcherKind::BruteForce],
            vec![SelectorKind::NearestNeighbor, SelectorKind::KNearestNeighbors],
        );
        let names: Vec<String> = registry
            .combinations()
            .iter()
            .map(|c| c.to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "FAST/BRIEF/MAT_BF/SEL_NN",
                "FAST/BRIEF/MAT_BF/SEL_KNN",
                "FAST/ORB/MAT_BF/SEL_NN",
                "FAST/ORB/MAT_BF/SEL_KNN",
                "ORB/BRIEF/MAT_BF/SEL_NN",
                "ORB/BRIEF/MAT_BF/SEL_KNN",
                "ORB/ORB/MAT_BF/SEL_NN",
                "ORB/ORB/MAT_BF/SEL_KNN",
            ]
        );
    }

    #[test]
    fn empty_lists_give_no_combinations() {
        let registry = AlgorithmRegistry::new(
            vec![DetectorKind::Harris],
            vec![DescriptorKind::Akaze],
            vec![MatcherKind::BruteForce],
            vec![SelectorKind::NearestNeighbor],
        );
        assert!(registry.combinations().is_empty());

        let registry = AlgorithmRegistry::new(vec![], vec![], vec![], vec![]);
        assert!(registry.combinations().is_empty());
    }
}
