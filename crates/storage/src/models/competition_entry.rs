use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Moderation state of an entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown entry status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionEntry {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Unset while the ticket is still pending assignment
    #[serde(default)]
    pub ticket_number: Option<String>,
    #[serde(default)]
    pub proof_of_payment_url: Option<String>,
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
}

fn status_or_pending<'de, D>(deserializer: D) -> Result<EntryStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EntryStatus>::deserialize(deserializer)?.unwrap_or_default())
}
