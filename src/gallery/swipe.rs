//! Horizontal swipe detection
//!
//! Tracks the x coordinate of a touch/drag from press to release and turns
//! the net displacement into a navigation direction.

use crate::config::DEFAULT_SWIPE_THRESHOLD_PX;

/// Navigation implied by a finished swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved right-to-left: show the next item
    Left,
    /// Finger moved left-to-right: show the previous item
    Right,
}

/// Touch start/end tracking
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeTracker {
    start_x: Option<f32>,
    end_x: Option<f32>,
    threshold: f32,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD_PX)
    }
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            start_x: None,
            end_x: None,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Touch began at `x`
    pub fn start(&mut self, x: f32) {
        self.start_x = Some(x);
        self.end_x = None;
    }

    /// Touch moved to `x`. Ignored when no touch is in progress.
    pub fn moved(&mut self, x: f32) {
        if self.start_x.is_some() {
            self.end_x = Some(x);
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.start_x.is_some()
    }

    /// Pressed and not moved since
    pub fn is_tap(&self) -> bool {
        match (self.start_x, self.end_x) {
            (Some(_), None) => true,
            (Some(start), Some(end)) => start == end,
            _ => false,
        }
    }

    /// Touch released. Returns a direction only when the displacement
    /// strictly exceeds the threshold. Tracking is reset either way.
    pub fn finish(&mut self) -> Option<SwipeDirection> {
        let start = self.start_x.take()?;
        let end = self.end_x.take()?;
        let distance = start - end;

        if distance > self.threshold {
            Some(SwipeDirection::Left)
        } else if distance < -self.threshold {
            Some(SwipeDirection::Right)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.start_x = None;
        self.end_x = None;
    }
}
