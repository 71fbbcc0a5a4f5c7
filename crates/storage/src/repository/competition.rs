use crate::backend::{COMPETITIONS, TableStore};
use crate::error::Result;
use crate::models::Competition;
use crate::query::{Query, SortDirection};

use super::decode_rows;

/// Repository for the `competitions` table
pub struct CompetitionRepository<'a> {
    store: &'a dyn TableStore,
}

impl<'a> CompetitionRepository<'a> {
    pub fn new(store: &'a dyn TableStore) -> Self {
        Self { store }
    }

    /// Competitions for the selector, newest first
    pub async fn list(&self) -> Result<Vec<Competition>> {
        let rows = self
            .store
            .select(
                COMPETITIONS,
                &Query::columns(&["id", "title"]).order("created_at", SortDirection::Descending),
            )
            .await?;

        decode_rows(rows)
    }
}
