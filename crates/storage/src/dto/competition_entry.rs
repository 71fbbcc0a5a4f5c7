use serde::{Deserialize, Serialize};

use crate::models::EntryStatus;

/// Partial update touching only the moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: EntryStatus,
}
