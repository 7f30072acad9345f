use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// A detected image location.
///
/// Positions are in pixel coordinates with `x` the column and `y` the row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyPoint {
    /// Column of the keypoint.
    pub x: f32,
    /// Row of the keypoint.
    pub y: f32,
    /// Diameter of the meaningful neighbourhood.
    pub size: f32,
    /// Orientation in degrees, `-1.0` when not computed.
    pub angle: f32,
    /// Detector response, higher is stronger.
    pub response: f32,
    /// Pyramid octave the keypoint was found in.
    pub octave: i32,
    /// Object class, `-1` when unused.
    pub class_id: i32,
}

impl Default for KeyPoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            size: 0.0,
            angle: -1.0,
            response: 0.0,
            octave: 0,
            class_id: -1,
        }
    }
}

impl KeyPoint {
    /// Create a keypoint at `(x, y)` with the given neighbourhood size.
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self {
            x,
            y,
            size,
            ..Default::default()
        }
    }

    /// Set the detector response.
    pub fn with_response(mut self, response: f32) -> Self {
        self.response = response;
        self
    }

    /// Overlap between the neighbourhoods of two keypoints.
    ///
    /// The neighbourhoods are circles of diameter `size`. The result is the
    /// intersection area over the union area, in `[0, 1]`. When one circle
    /// contains the other the ratio of their areas is returned.
    pub fn overlap(&self, other: &KeyPoint) -> f32 {
        let a = self.size * 0.5;
        let b = other.size * 0.5;
        let a_2 = a * a;
        let b_2 = b * b;
        let c = ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt();

        if a.min(b) + c <= a.max(b) {
            return a_2.min(b_2) / a_2.max(b_2);
        }

        if c >= a + b {
            return 0.0;
        }

        let c_2 = c * c;
        let cos_alpha = (b_2 + c_2 - a_2) / (other.size * c);
        let cos_beta = (a_2 + c_2 - b_2) / (self.size * c);
        let alpha = cos_alpha.clamp(-1.0, 1.0).acos();
        let beta = cos_beta.clamp(-1.0, 1.0).acos();

        let segment_a = a_2 * beta;
        let segment_b = b_2 * alpha;
        let triangle_a = a_2 * beta.sin() * cos_beta;
        let triangle_b = b_2 * alpha.sin() * cos_alpha;

        let intersection = segment_a + segment_b - triangle_a - triangle_b;
        let union = (a_2 + b_2) * PI - intersection;

        intersection / union
    }
}

/// A correspondence between a source and a reference descriptor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Row of the source (query) descriptor.
    pub query_idx: usize,
    /// Row of the reference (train) descriptor.
    pub train_idx: usize,
    /// Descriptor distance, lower is better.
    pub distance: f32,
}

impl Match {
    /// Create a new correspondence.
    pub fn new(query_idx: usize, train_idx: usize, distance: f32) -> Self {
        Self {
            query_idx,
            train_idx,
            distance,
        }
    }
}

/// An axis aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside the rectangle.
    ///
    /// The point is first rounded to the nearest pixel, ties to even, as
    /// OpenCV does when a `Point2f` is tested against an integer `Rect`. The
    /// left and top edges are inside, the right and bottom edges are not.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (px, py) = (round_half_even(x), round_half_even(y));
        self.x <= px && px < self.x + self.width && self.y <= py && py < self.y + self.height
    }
}

fn round_half_even(v: f32) -> i32 {
    let rounded = v.round();
    if (v - v.trunc()).abs() == 0.5 && rounded % 2.0 != 0.0 {
        (rounded - v.signum()) as i32
    } else {
        rounded as i32
    }
}
