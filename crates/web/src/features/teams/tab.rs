use std::sync::Arc;

use async_trait::async_trait;
use storage::{
    ObjectStore, TableStore,
    dto::{image::ImageUpload, team_member::TeamMemberDraft},
    models::TeamMember,
};
use tracing::warn;
use uuid::Uuid;

use crate::crud::{Confirm, CrudResource, CrudSync, Editor};
use crate::error::{WebError, WebResult};
use crate::notify::{Notification, Notifier};

use super::services;

/// The `teams` table as a CRUD resource
pub struct TeamResource {
    store: Arc<dyn TableStore>,
}

impl TeamResource {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CrudResource for TeamResource {
    type Record = TeamMember;
    type Draft = TeamMemberDraft;
    type Id = Uuid;

    const SINGULAR: &'static str = "team member";
    const PLURAL: &'static str = "team members";

    fn id(record: &TeamMember) -> Uuid {
        record.id
    }

    fn draft(record: &TeamMember) -> TeamMemberDraft {
        TeamMemberDraft::from(record)
    }

    async fn list(&self) -> storage::Result<Vec<TeamMember>> {
        services::list_members(self.store.as_ref()).await
    }

    async fn create(&self, draft: TeamMemberDraft) -> storage::Result<TeamMember> {
        services::create_member(self.store.as_ref(), &draft.into_payload()).await
    }

    async fn update(&self, id: &Uuid, draft: TeamMemberDraft) -> storage::Result<()> {
        services::update_member(self.store.as_ref(), *id, &draft.into_payload()).await
    }

    async fn delete(&self, id: &Uuid) -> storage::Result<()> {
        services::delete_member(self.store.as_ref(), *id).await
    }
}

/// An image upload that has been started but not yet stored.
///
/// Holds its own handles so the host can drive it while the tab keeps
/// handling input. Remembers which form it was started from.
pub struct PendingUpload {
    objects: Arc<dyn ObjectStore>,
    bucket: String,
    image: ImageUpload,
    form: u64,
}

impl PendingUpload {
    pub async fn send(self) -> UploadOutcome {
        let result = services::upload_image(self.objects.as_ref(), &self.bucket, &self.image).await;
        UploadOutcome {
            result,
            form: self.form,
        }
    }
}

/// Result of a [`PendingUpload`], to be handed back to [`TeamsTab::finish_upload`]
pub struct UploadOutcome {
    result: storage::Result<String>,
    form: u64,
}

/// Admin tab for team members: the shared CRUD table plus photo upload.
///
/// Submitting goes through [`TeamsTab::submit`] only, so the upload guard
/// cannot be bypassed.
pub struct TeamsTab {
    crud: CrudSync<TeamResource>,
    objects: Arc<dyn ObjectStore>,
    bucket: String,
    uploading: bool,
    /// Bumped whenever a form is opened or closed
    form: u64,
}

impl TeamsTab {
    pub fn new(
        tables: Arc<dyn TableStore>,
        objects: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            crud: CrudSync::new(TeamResource::new(tables)),
            objects,
            bucket: bucket.into(),
            uploading: false,
            form: 0,
        }
    }

    pub async fn mount(&mut self) -> WebResult<()> {
        self.crud.refresh().await
    }

    pub fn members(&self) -> &[TeamMember] {
        self.crud.items()
    }

    pub fn is_loading(&self) -> bool {
        self.crud.is_loading()
    }

    pub fn editor(&self) -> &Editor<Uuid, TeamMemberDraft> {
        self.crud.editor()
    }

    pub fn notifications(&mut self) -> &mut Notifier {
        self.crud.notifications()
    }

    pub fn open_create(&mut self) {
        self.form += 1;
        self.crud.open_create();
    }

    pub fn open_edit(&mut self, member: &TeamMember) {
        self.form += 1;
        self.crud.open_edit(member);
    }

    pub fn close_editor(&mut self) {
        self.form += 1;
        self.crud.close_editor();
    }

    pub fn draft(&self) -> Option<&TeamMemberDraft> {
        self.crud.draft()
    }

    pub fn draft_mut(&mut self) -> Option<&mut TeamMemberDraft> {
        self.crud.draft_mut()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Accept a picked file and mark the form as uploading.
    ///
    /// Fails when no form is open, another upload is running, or the file
    /// is not an image.
    pub fn begin_upload(&mut self, file_name: &str, bytes: Vec<u8>) -> WebResult<PendingUpload> {
        if self.crud.draft_mut().is_none() {
            return Err(WebError::BadRequest(
                "Open a team member form before uploading an image".to_string(),
            ));
        }
        if self.uploading {
            return Err(WebError::BadRequest(
                "An image is already uploading".to_string(),
            ));
        }

        let image = match ImageUpload::new(file_name, bytes) {
            Ok(image) => image,
            Err(e) => {
                let err = WebError::Upload(e);
                self.crud
                    .notifications()
                    .push(err.notification("Error uploading image"));
                return Err(err);
            }
        };

        self.uploading = true;
        Ok(PendingUpload {
            objects: self.objects.clone(),
            bucket: self.bucket.clone(),
            image,
            form: self.form,
        })
    }

    /// Record an upload result. The URL only goes into the draft of the form
    /// the upload was started from; if that form is gone it is dropped.
    pub fn finish_upload(&mut self, outcome: UploadOutcome) -> WebResult<String> {
        self.uploading = false;

        match outcome.result {
            Ok(url) => {
                let current = outcome.form == self.form;
                match self.crud.draft_mut().filter(|_| current) {
                    Some(draft) => draft.image_url = url.clone(),
                    None => warn!("Form closed before upload finished; dropping {}", url),
                }
                self.crud
                    .notifications()
                    .push(Notification::success("Image uploaded successfully"));
                Ok(url)
            }
            Err(e) => {
                let err = WebError::Upload(e);
                self.crud
                    .notifications()
                    .push(err.notification("Error uploading image"));
                Err(err)
            }
        }
    }

    pub async fn upload_image(&mut self, file_name: &str, bytes: Vec<u8>) -> WebResult<String> {
        let pending = self.begin_upload(file_name, bytes)?;
        let outcome = pending.send().await;
        self.finish_upload(outcome)
    }

    /// Save the open form, returning the member's id
    pub async fn submit(&mut self) -> WebResult<Uuid> {
        if self.uploading {
            warn!("Submit refused while an image is uploading");
            return Err(WebError::BadRequest(
                "Please wait for the image upload to finish".to_string(),
            ));
        }

        let saved = self.crud.submit().await?;
        self.form += 1;
        Ok(saved)
    }

    pub async fn delete(&mut self, id: Uuid, confirm: &dyn Confirm) -> WebResult<bool> {
        self.crud.delete(&id, confirm).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use storage::MemoryStore;
    use storage::backend::{DEFAULT_IMAGE_BUCKET, TEAMS};
    use storage::memory::Operation;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn tab() -> (TeamsTab, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_public_base("https://abc.example.co"));
        let tab = TeamsTab::new(store.clone(), store.clone(), DEFAULT_IMAGE_BUCKET);
        (tab, store)
    }

    fn fill(draft: &mut TeamMemberDraft) {
        draft.name = "Ada Lovelace".to_string();
        draft.role = "Chair".to_string();
        draft.bio = "Wrote the first program.".to_string();
    }

    fn yes(_: &str) -> bool {
        true
    }

    #[tokio::test]
    async fn test_uploaded_photo_becomes_one_active_row() {
        let (mut tab, store) = tab();
        tab.open_create();
        fill(tab.draft_mut().unwrap());

        let url = tab.upload_image("photo.png", PNG.to_vec()).await.unwrap();

        assert!(url.starts_with("https://abc.example.co/storage/v1/object/public/team-images/"));
        assert!(url.ends_with(".png"));
        assert_eq!(tab.draft().unwrap().image_url, url);
        assert!(!tab.is_uploading());

        let id = tab.submit().await.unwrap();

        let rows = store.rows(TEAMS);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["status"], "active");
        assert_eq!(rows[0]["image_url"], url.as_str());
        assert_eq!(tab.members().len(), 1);
        assert_eq!(tab.members()[0].id, id);
        assert_eq!(tab.members()[0].image_url, url);

        let path = url.rsplit('/').next().unwrap();
        assert_eq!(store.object(DEFAULT_IMAGE_BUCKET, path).unwrap(), PNG);
        assert_eq!(
            store.object_content_type(DEFAULT_IMAGE_BUCKET, path).as_deref(),
            Some("image/png")
        );
    }

    #[tokio::test]
    async fn test_blank_optionals_are_stored_as_null() {
        let (mut tab, store) = tab();
        tab.open_create();
        let draft = tab.draft_mut().unwrap();
        fill(draft);
        draft.image_url = "https://cdn.example.com/ada.png".to_string();
        draft.linkedin_url = "   ".to_string();

        tab.submit().await.unwrap();

        let rows = store.rows(TEAMS);
        assert_eq!(rows[0]["linkedin_url"], Value::Null);
        assert_eq!(rows[0]["email"], Value::Null);
    }

    #[tokio::test]
    async fn test_submit_refused_while_uploading() {
        let (mut tab, store) = tab();
        tab.open_create();
        fill(tab.draft_mut().unwrap());

        let pending = tab.begin_upload("photo.png", PNG.to_vec()).unwrap();
        assert!(tab.is_uploading());
        assert!(matches!(tab.submit().await, Err(WebError::BadRequest(_))));
        assert_eq!(store.calls(Operation::Insert), 0);

        let outcome = pending.send().await;
        tab.finish_upload(outcome).unwrap();
        tab.submit().await.unwrap();
        assert_eq!(store.rows(TEAMS).len(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_image_unset() {
        let (mut tab, store) = tab();
        store.fail(Operation::Upload);
        tab.open_create();
        fill(tab.draft_mut().unwrap());

        let err = tab.upload_image("photo.png", PNG.to_vec()).await.unwrap_err();

        assert!(matches!(err, WebError::Upload(_)));
        assert!(!tab.is_uploading());
        assert_eq!(
            tab.notifications().latest().unwrap().description,
            "Error uploading image"
        );
        assert!(tab.draft().unwrap().image_url.is_empty());
        assert!(tab.submit().await.unwrap_err().is_validation());
        assert_eq!(store.calls(Operation::Insert), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images() {
        let (mut tab, store) = tab();
        tab.open_create();

        assert!(tab.upload_image("notes.txt", b"hello".to_vec()).await.is_err());
        assert!(!tab.is_uploading());
        assert_eq!(store.calls(Operation::Upload), 0);
    }

    #[tokio::test]
    async fn test_upload_needs_open_form() {
        let (mut tab, _store) = tab();
        assert!(matches!(
            tab.upload_image("photo.png", PNG.to_vec()).await,
            Err(WebError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_list_includes_every_status() {
        let (mut tab, store) = tab();
        store.seed(
            TEAMS,
            [
                ("Bob", "inactive", "2024-02-01T00:00:00Z"),
                ("Alice", "active", "2024-01-01T00:00:00Z"),
            ]
            .map(|(name, status, created_at)| {
                json!({
                    "id": Uuid::new_v4(),
                    "name": name,
                    "role": "Member",
                    "bio": "Bio",
                    "image_url": "https://cdn.example.com/x.png",
                    "status": status,
                    "created_at": created_at,
                })
            }),
        );

        tab.mount().await.unwrap();

        let names: Vec<&str> = tab.members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_edit_then_delete() {
        let (mut tab, store) = tab();
        tab.open_create();
        let draft = tab.draft_mut().unwrap();
        fill(draft);
        draft.image_url = "https://cdn.example.com/ada.png".to_string();
        tab.submit().await.unwrap();
        let member = tab.members()[0].clone();

        tab.open_edit(&member);
        tab.draft_mut().unwrap().role = "Treasurer".to_string();
        assert_eq!(tab.submit().await.unwrap(), member.id);
        assert_eq!(tab.members()[0].role, "Treasurer");
        assert_eq!(
            tab.notifications().latest().unwrap().description,
            "Team member updated successfully"
        );

        store.fail(Operation::Delete);
        assert!(tab.delete(member.id, &yes).await.is_err());
        assert_eq!(tab.members().len(), 1);
        assert_eq!(
            tab.notifications().latest().unwrap().description,
            "Failed to delete team member"
        );

        store.recover(Operation::Delete);
        assert!(tab.delete(member.id, &yes).await.unwrap());
        assert!(tab.members().is_empty());
        assert!(store.rows(TEAMS).is_empty());
    }

    #[tokio::test]
    async fn test_saved_edit_is_not_reported_failed_when_reload_fails() {
        let (mut tab, store) = tab();
        tab.open_create();
        let draft = tab.draft_mut().unwrap();
        fill(draft);
        draft.image_url = "https://cdn.example.com/ada.png".to_string();
        tab.submit().await.unwrap();
        let member = tab.members()[0].clone();

        tab.open_edit(&member);
        tab.draft_mut().unwrap().role = "Treasurer".to_string();
        store.fail(Operation::Select);

        assert_eq!(tab.submit().await.unwrap(), member.id);
        assert_eq!(store.rows(TEAMS)[0]["role"], "Treasurer");
        assert_eq!(*tab.editor(), Editor::Idle);

        let descriptions: Vec<String> = tab
            .notifications()
            .drain()
            .into_iter()
            .map(|n| n.description)
            .collect();
        assert!(descriptions.iter().any(|d| d == "Team member updated successfully"));
        assert!(!descriptions.iter().any(|d| d == "Failed to update team member"));
        assert_eq!(descriptions.last().unwrap(), "Failed to fetch team members");
    }

    #[tokio::test]
    async fn test_upload_for_closed_form_skips_next_form() {
        let (mut tab, _store) = tab();
        tab.open_create();
        let pending = tab.begin_upload("photo.png", PNG.to_vec()).unwrap();

        tab.close_editor();
        tab.open_create();
        let outcome = pending.send().await;
        let url = tab.finish_upload(outcome).unwrap();

        assert!(!url.is_empty());
        assert!(!tab.is_uploading());
        assert!(tab.draft().unwrap().image_url.is_empty());
    }

    #[tokio::test]
    async fn test_upload_for_current_form_is_kept_after_edits() {
        let (mut tab, _store) = tab();
        tab.open_create();
        let pending = tab.begin_upload("photo.png", PNG.to_vec()).unwrap();
        fill(tab.draft_mut().unwrap());

        let outcome = pending.send().await;
        let url = tab.finish_upload(outcome).unwrap();

        assert_eq!(tab.draft().unwrap().image_url, url);
        assert_eq!(tab.draft().unwrap().name, "Ada Lovelace");
    }
}
