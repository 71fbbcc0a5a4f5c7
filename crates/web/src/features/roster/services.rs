use storage::{
    TableStore, error::Result, models::TeamMember, repository::team::TeamRepository,
};

/// Active members in founding order
pub async fn load_active_members(store: &dyn TableStore) -> Result<Vec<TeamMember>> {
    let repo = TeamRepository::new(store);
    repo.list_active().await
}
