use uuid::Uuid;

use crate::backend::{COMPETITION_ENTRIES, TableStore};
use crate::dto::competition_entry::StatusUpdate;
use crate::error::{Result, StorageError};
use crate::models::{CompetitionEntry, EntryStatus};
use crate::query::{Query, SortDirection};

use super::decode_rows;

/// Repository for the `competition_entries` table
pub struct EntryRepository<'a> {
    store: &'a dyn TableStore,
}

impl<'a> EntryRepository<'a> {
    pub fn new(store: &'a dyn TableStore) -> Self {
        Self { store }
    }

    /// Entries of one competition, newest first
    pub async fn list_for_competition(&self, competition_id: Uuid) -> Result<Vec<CompetitionEntry>> {
        let rows = self
            .store
            .select(
                COMPETITION_ENTRIES,
                &Query::all()
                    .eq("competition_id", competition_id.to_string())
                    .order("created_at", SortDirection::Descending),
            )
            .await?;

        decode_rows(rows)
    }

    /// Partial update restricted to the moderation status
    pub async fn update_status(&self, id: Uuid, status: EntryStatus) -> Result<()> {
        let affected = self
            .store
            .update(
                COMPETITION_ENTRIES,
                &id.to_string(),
                serde_json::to_value(StatusUpdate { status })?,
            )
            .await?;

        if affected == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
