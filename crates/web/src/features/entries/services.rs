use storage::{
    TableStore,
    error::Result,
    models::{Competition, CompetitionEntry, EntryStatus},
    repository::{competition::CompetitionRepository, entry::EntryRepository},
};
use uuid::Uuid;

pub async fn list_competitions(store: &dyn TableStore) -> Result<Vec<Competition>> {
    let repo = CompetitionRepository::new(store);
    repo.list().await
}

/// Entries of one competition, newest first
pub async fn list_entries(store: &dyn TableStore, competition_id: Uuid) -> Result<Vec<CompetitionEntry>> {
    let repo = EntryRepository::new(store);
    repo.list_for_competition(competition_id).await
}

pub async fn set_entry_status(store: &dyn TableStore, id: Uuid, status: EntryStatus) -> Result<()> {
    let repo = EntryRepository::new(store);
    repo.update_status(id, status).await
}
