use std::time::Duration;

use serde::Serialize;

use super::easing::EASE_OUT;

/// Upward travel while hovered
pub const LIFT: f32 = 5.0;
pub const TRANSITION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoverOptions {
    pub scale: f32,
}

impl Default for HoverOptions {
    fn default() -> Self {
        Self { scale: 1.02 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub translate_y: f32,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate_y: 0.0,
        scale: 1.0,
    };

    fn lerp(self, to: Transform, p: f32) -> Transform {
        Transform {
            translate_y: self.translate_y + (to.translate_y - self.translate_y) * p,
            scale: self.scale + (to.scale - self.scale) * p,
        }
    }
}

/// Lift-and-grow effect while the pointer is over an element.
///
/// Entering or leaving mid-transition starts the new transition from the
/// transform currently on screen.
#[derive(Debug, Clone)]
pub struct HoverElevate {
    options: HoverOptions,
    hovered: bool,
    from: Transform,
    to: Transform,
    started: Duration,
}

impl HoverElevate {
    pub fn new(options: HoverOptions) -> Self {
        Self {
            options,
            hovered: false,
            from: Transform::IDENTITY,
            to: Transform::IDENTITY,
            started: Duration::ZERO,
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn elevated(&self) -> Transform {
        Transform {
            translate_y: -LIFT,
            scale: self.options.scale,
        }
    }

    pub fn pointer_enter(&mut self, now: Duration) {
        if !self.hovered {
            self.hovered = true;
            self.retarget(self.elevated(), now);
        }
    }

    pub fn pointer_leave(&mut self, now: Duration) {
        if self.hovered {
            self.hovered = false;
            self.retarget(Transform::IDENTITY, now);
        }
    }

    pub fn transform(&self, now: Duration) -> Transform {
        let elapsed = now.saturating_sub(self.started);
        let linear = elapsed.as_secs_f32() / TRANSITION.as_secs_f32();
        self.from.lerp(self.to, EASE_OUT.ease(linear))
    }

    fn retarget(&mut self, to: Transform, now: Duration) {
        self.from = self.transform(now);
        self.to = to;
        self.started = now;
    }
}

impl Default for HoverElevate {
    fn default() -> Self {
        Self::new(HoverOptions::default())
    }
}
