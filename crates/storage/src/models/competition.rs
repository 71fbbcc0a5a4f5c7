use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of a competition the admin selector needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub id: Uuid,
    pub title: String,
}
