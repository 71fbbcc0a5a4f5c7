use storage::{
    ObjectStore, TableStore,
    dto::{image::ImageUpload, team_member::TeamMemberPayload},
    error::Result,
    models::TeamMember,
    repository::{image::ImageBucket, team::TeamRepository},
};
use uuid::Uuid;

/// Every team member regardless of status
pub async fn list_members(store: &dyn TableStore) -> Result<Vec<TeamMember>> {
    let repo = TeamRepository::new(store);
    repo.list().await
}

pub async fn create_member(
    store: &dyn TableStore,
    payload: &TeamMemberPayload,
) -> Result<TeamMember> {
    let repo = TeamRepository::new(store);
    repo.create(payload).await
}

pub async fn update_member(
    store: &dyn TableStore,
    id: Uuid,
    payload: &TeamMemberPayload,
) -> Result<()> {
    let repo = TeamRepository::new(store);
    repo.update(id, payload).await
}

pub async fn delete_member(store: &dyn TableStore, id: Uuid) -> Result<()> {
    let repo = TeamRepository::new(store);
    repo.delete(id).await
}

/// Store a member photo and return its public URL
pub async fn upload_image(
    objects: &dyn ObjectStore,
    bucket: &str,
    image: &ImageUpload,
) -> Result<String> {
    ImageBucket::new(objects, bucket).upload(image).await
}
