//! Presentation-only primitives driven by the caller's clock.
//!
//! Times are [`Duration`](std::time::Duration)s on whatever timeline the host
//! uses (typically "since mount"); nothing here reads a wall clock.

pub mod easing;
pub mod hover;
pub mod reveal;
pub mod viewport;

pub use easing::CubicBezier;
pub use hover::{HoverElevate, HoverOptions, Transform};
pub use reveal::{Direction, Reveal, RevealOptions, RevealState, Visual};
pub use viewport::{Rect, Viewport};
