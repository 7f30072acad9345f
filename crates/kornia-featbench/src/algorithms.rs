use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FeatBenchError;

/// Implements the string round trip for an identifier enum.
///
/// The canonical names are the upper-case identifiers used in reports and
/// configuration files, e.g. `SHITOMASI` or `MAT_BF`. Serde goes through the
/// same parser as the command line.
macro_rules! identifier_enum {
    ($ty:ident, $stage:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// All the variants in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// The canonical identifier of the variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = FeatBenchError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(FeatBenchError::UnsupportedAlgorithm {
                        stage: $stage,
                        name: s.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = String::deserialize(deserializer)?;
                name.parse().map_err(de::Error::custom)
            }
        }
    };
}

/// Keypoint detector identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    /// Shi-Tomasi good features to track.
    ShiTomasi,
    /// Harris corner response with overlap suppression.
    Harris,
    /// FAST segment test detector.
    Fast,
    /// BRISK detector.
    Brisk,
    /// ORB detector.
    Orb,
    /// AKAZE detector.
    Akaze,
    /// SIFT detector.
    Sift,
}

identifier_enum!(DetectorKind, "detector", {
    ShiTomasi => "SHITOMASI",
    Harris => "HARRIS",
    Fast => "FAST",
    Brisk => "BRISK",
    Orb => "ORB",
    Akaze => "AKAZE",
    Sift => "SIFT",
});

/// Descriptor extractor identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    /// BRISK binary descriptor.
    Brisk,
    /// BRIEF binary descriptor.
    Brief,
    /// ORB binary descriptor.
    Orb,
    /// FREAK binary descriptor.
    Freak,
    /// AKAZE (MLDB) binary descriptor.
    Akaze,
    /// SIFT gradient histogram descriptor.
    Sift,
}

identifier_enum!(DescriptorKind, "descriptor", {
    Brisk => "BRISK",
    Brief => "BRIEF",
    Orb => "ORB",
    Freak => "FREAK",
    Akaze => "AKAZE",
    Sift => "SIFT",
});

impl DescriptorKind {
    /// The distance family of the descriptor.
    pub fn family(&self) -> DescriptorFamily {
        match self {
            DescriptorKind::Sift => DescriptorFamily::Hog,
            _ => DescriptorFamily::Binary,
        }
    }
}

/// Descriptor matcher identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    /// Exhaustive brute force matching.
    BruteForce,
    /// Approximate nearest neighbour matching.
    Flann,
}

identifier_enum!(MatcherKind, "matcher", {
    BruteForce => "MAT_BF",
    Flann => "MAT_FLANN",
});

/// Match selection strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// Keep the nearest neighbour of every source descriptor.
    NearestNeighbor,
    /// Two nearest neighbours filtered by the distance ratio test.
    KNearestNeighbors,
}

identifier_enum!(SelectorKind, "selector", {
    NearestNeighbor => "SEL_NN",
    KNearestNeighbors => "SEL_KNN",
});

/// How descriptor distances are measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorFamily {
    /// Bit strings compared with the Hamming distance.
    Binary,
    /// Floating point histograms compared with the L2 distance.
    Hog,
}

impl fmt::Display for DescriptorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorFamily::Binary => f.write_str("DES_BINARY"),
            DescriptorFamily::Hog => f.write_str("DES_HOG"),
        }
    }
}
