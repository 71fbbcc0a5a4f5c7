pub mod entries;
pub mod roster;
pub mod teams;
