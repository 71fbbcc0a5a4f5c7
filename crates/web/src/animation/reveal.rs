use std::time::Duration;

use serde::Serialize;

use super::easing::REVEAL;
use super::viewport::{Rect, Viewport};

/// Distance a hidden element sits away from its resting place
pub const OFFSET: f32 = 40.0;

/// Side the element travels in from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Hidden-state `(x, y)` displacement
    pub fn offset(self) -> (f32, f32) {
        match self {
            Self::Up => (0.0, OFFSET),
            Self::Down => (0.0, -OFFSET),
            Self::Left => (OFFSET, 0.0),
            Self::Right => (-OFFSET, 0.0),
            Self::None => (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevealOptions {
    pub delay: Duration,
    pub duration: Duration,
    pub direction: Direction,
    /// CSS-style root margin in pixels; negative values shrink the viewport
    pub viewport_margin: f32,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            duration: Duration::from_millis(500),
            direction: Direction::Up,
            viewport_margin: -50.0,
        }
    }
}

impl RevealOptions {
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn towards(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn lasting(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Opacity and translation to paint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Visual {
    pub opacity: f32,
    pub x: f32,
    pub y: f32,
}

impl Visual {
    pub const RESTING: Visual = Visual {
        opacity: 1.0,
        x: 0.0,
        y: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    /// Entered the viewport at `at`; never goes back to hidden
    Revealed { at: Duration },
}

/// One-shot fade-in that fires the first time its element is seen
#[derive(Debug, Clone)]
pub struct Reveal {
    options: RevealOptions,
    state: RevealState,
}

impl Reveal {
    pub fn new(options: RevealOptions) -> Self {
        Self {
            options,
            state: RevealState::Hidden,
        }
    }

    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self.state, RevealState::Revealed { .. })
    }

    /// Feed the element's current bounds. Returns `true` only for the call
    /// that starts the transition.
    pub fn observe(&mut self, bounds: &Rect, viewport: &Viewport, now: Duration) -> bool {
        if self.is_revealed() || !viewport.intersects(bounds, self.options.viewport_margin) {
            return false;
        }
        self.state = RevealState::Revealed { at: now };
        true
    }

    /// Eased transition progress in `[0, 1]`
    pub fn progress(&self, now: Duration) -> f32 {
        let RevealState::Revealed { at } = self.state else {
            return 0.0;
        };

        let elapsed = now.saturating_sub(at);
        if elapsed < self.options.delay {
            return 0.0;
        }
        if self.options.duration.is_zero() {
            return 1.0;
        }

        let linear = (elapsed - self.options.delay).as_secs_f32() / self.options.duration.as_secs_f32();
        REVEAL.ease(linear)
    }

    pub fn is_settled(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn visual(&self, now: Duration) -> Visual {
        let p = self.progress(now);
        let (dx, dy) = self.options.direction.offset();
        Visual {
            opacity: p,
            x: dx * (1.0 - p),
            y: dy * (1.0 - p),
        }
    }
}
