/// CSS-style cubic Bézier timing curve anchored at (0, 0) and (1, 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

/// Curve used by the reveal transition
pub const REVEAL: CubicBezier = CubicBezier::new(0.25, 0.25, 0.0, 1.0);

/// `ease-out`
pub const EASE_OUT: CubicBezier = CubicBezier::new(0.0, 0.0, 0.58, 1.0);

const EPSILON: f32 = 1e-6;

impl CubicBezier {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Eased progress for linear progress `t`, clamped to `[0, 1]`
    pub fn ease(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        sample(self.y1, self.y2, self.solve_x(t))
    }

    /// Curve parameter `s` whose x coordinate is `x`
    fn solve_x(&self, x: f32) -> f32 {
        let mut s = x;
        for _ in 0..8 {
            let error = sample(self.x1, self.x2, s) - x;
            if error.abs() < EPSILON {
                return s;
            }
            let d = slope(self.x1, self.x2, s);
            if d.abs() < EPSILON {
                break;
            }
            s -= error / d;
        }

        // Newton stalled on a flat segment; bisect instead
        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        s = x;
        for _ in 0..40 {
            let value = sample(self.x1, self.x2, s);
            if (value - x).abs() < EPSILON {
                break;
            }
            if value < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) / 2.0;
        }
        s
    }
}

fn coefficients(p1: f32, p2: f32) -> (f32, f32, f32) {
    let c = 3.0 * p1;
    let b = 3.0 * (p2 - p1) - c;
    let a = 1.0 - c - b;
    (a, b, c)
}

fn sample(p1: f32, p2: f32, s: f32) -> f32 {
    let (a, b, c) = coefficients(p1, p2);
    ((a * s + b) * s + c) * s
}

fn slope(p1: f32, p2: f32, s: f32) -> f32 {
    let (a, b, c) = coefficients(p1, p2);
    (3.0 * a * s + 2.0 * b) * s + c
}
