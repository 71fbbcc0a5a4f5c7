/// Axis-aligned box in viewport coordinates (origin at the viewport's top-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether `bounds` touches the viewport grown by `margin` on every side.
    ///
    /// A negative margin shrinks the observed area, so an element has to be
    /// that far inside before it counts as visible. Edge contact counts.
    pub fn intersects(&self, bounds: &Rect, margin: f32) -> bool {
        let (left, top) = (-margin, -margin);
        let (right, bottom) = (self.width + margin, self.height + margin);
        if right < left || bottom < top {
            return false;
        }

        bounds.x <= right && bounds.right() >= left && bounds.y <= bottom && bounds.bottom() >= top
    }
}
