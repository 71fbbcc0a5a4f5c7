pub mod services;
pub mod tab;

pub use tab::{PendingUpload, TeamResource, TeamsTab, UploadOutcome};
