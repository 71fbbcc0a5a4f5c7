use uuid::Uuid;

use crate::backend::{TEAMS, TableStore};
use crate::dto::team_member::TeamMemberPayload;
use crate::error::{Result, StorageError};
use crate::models::{ACTIVE_STATUS, TeamMember};
use crate::query::{Query, SortDirection};

use super::decode_rows;

/// Repository for the `teams` table
pub struct TeamRepository<'a> {
    store: &'a dyn TableStore,
}

impl<'a> TeamRepository<'a> {
    pub fn new(store: &'a dyn TableStore) -> Self {
        Self { store }
    }

    /// Active members in founding order (oldest first)
    pub async fn list_active(&self) -> Result<Vec<TeamMember>> {
        let rows = self
            .store
            .select(
                TEAMS,
                &Query::all()
                    .eq("status", ACTIVE_STATUS)
                    .order("created_at", SortDirection::Ascending),
            )
            .await?;

        decode_rows(rows)
    }

    /// Every member regardless of status, oldest first
    pub async fn list(&self) -> Result<Vec<TeamMember>> {
        let rows = self
            .store
            .select(
                TEAMS,
                &Query::all().order("created_at", SortDirection::Ascending),
            )
            .await?;

        decode_rows(rows)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<TeamMember> {
        let rows = self
            .store
            .select(TEAMS, &Query::all().eq("id", id.to_string()))
            .await?;

        decode_rows(rows)?
            .into_iter()
            .next()
            .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, payload: &TeamMemberPayload) -> Result<TeamMember> {
        let row = self
            .store
            .insert(TEAMS, serde_json::to_value(payload)?)
            .await?;

        Ok(serde_json::from_value(row)?)
    }

    /// Overwrite the member's fields. Callers re-read the row if they need it.
    pub async fn update(&self, id: Uuid, payload: &TeamMemberPayload) -> Result<()> {
        let affected = self
            .store
            .update(TEAMS, &id.to_string(), serde_json::to_value(payload)?)
            .await?;

        if affected == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let affected = self.store.delete(TEAMS, &id.to_string()).await?;

        if affected == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
