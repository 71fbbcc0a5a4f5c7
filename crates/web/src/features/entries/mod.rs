pub mod services;
pub mod tab;

pub use tab::{Decision, EntriesRequest, EntriesResponse, EntriesTab};
