pub mod services;
pub mod view;

pub use view::{HEADING, RosterCard, RosterSection, RosterView};
