use std::collections::VecDeque;

use crate::keypoint::{KeyPoint, Match};

/// Number of frames held by the window: the current one and one lookback.
pub const FRAME_WINDOW_CAPACITY: usize = 2;

/// The data gathered for one image of the sequence.
#[derive(Clone, Debug)]
pub struct Frame<I, D> {
    /// The grayscale image.
    pub image: I,
    /// Keypoints kept after filtering.
    pub keypoints: Vec<KeyPoint>,
    /// Descriptors aligned row by row with `keypoints`.
    pub descriptors: D,
    /// Matches between the previous frame and this one.
    pub matches: Vec<Match>,
}

impl<I, D> Frame<I, D> {
    /// Create a frame that has not been matched yet.
    pub fn new(image: I, keypoints: Vec<KeyPoint>, descriptors: D) -> Self {
        Self {
            image,
            keypoints,
            descriptors,
            matches: Vec::new(),
        }
    }
}

/// A sliding window over the last two frames.
///
/// Pushing into a full window drops the oldest frame.
#[derive(Debug)]
pub struct FrameWindow<I, D> {
    frames: VecDeque<Frame<I, D>>,
}

impl<I, D> Default for FrameWindow<I, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, D> FrameWindow<I, D> {
    /// Create an empty window.
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(FRAME_WINDOW_CAPACITY),
        }
    }

    /// Append a frame, evicting the oldest one when the window is full.
    pub fn push(&mut self, frame: Frame<I, D>) {
        if self.frames.len() == FRAME_WINDOW_CAPACITY {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// The most recently pushed frame.
    pub fn current(&self) -> Option<&Frame<I, D>> {
        self.frames.back()
    }

    /// Mutable access to the most recently pushed frame.
    pub fn current_mut(&mut self) -> Option<&mut Frame<I, D>> {
        self.frames.back_mut()
    }

    /// The frame pushed before the current one, if the window is full.
    pub fn previous(&self) -> Option<&Frame<I, D>> {
        if self.frames.len() == FRAME_WINDOW_CAPACITY {
            self.frames.front()
        } else {
            None
        }
    }

    /// Both frames as `(previous, current)`, with the current one mutable.
    pub fn pair_mut(&mut self) -> Option<(&Frame<I, D>, &mut Frame<I, D>)> {
        if self.frames.len() != FRAME_WINDOW_CAPACITY {
            return None;
        }
        let (front, back) = self.frames.as_mut_slices();
        match (front, back) {
            ([previous, current], []) => Some((&*previous, current)),
            ([previous], [current]) => Some((&*previous, current)),
            ([], [previous, current]) => Some((&*previous, current)),
            _ => None,
        }
    }

    /// Whether the window holds two frames and matching can run.
    pub fn is_full(&self) -> bool {
        self.frames.len() == FRAME_WINDOW_CAPACITY
    }

    /// Drop all frames.
    pub fn reset(&mut self) {
        self.frames.clear();
    }

    /// Number of frames held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the window holds no frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
