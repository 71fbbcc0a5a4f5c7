//! Fetch, mutate, re-fetch: the synchronization loop shared by admin tables.
//!
//! Nothing is applied optimistically. Every successful mutation is followed
//! by a full re-fetch so the table always shows what the store holds.

use std::fmt;
use std::mem;

use async_trait::async_trait;
use tracing::{info, warn};
use validator::Validate;

use crate::error::{WebError, WebResult};
use crate::notify::{Notification, Notifier};

/// The list/create/update/delete capability set of one record type
#[async_trait]
pub trait CrudResource: Send + Sync {
    type Record: Clone + Send + Sync;
    type Draft: Clone + Default + Validate + Send + Sync;
    type Id: Clone + PartialEq + fmt::Display + Send + Sync;

    /// Lowercase noun used in messages, e.g. "team member"
    const SINGULAR: &'static str;
    const PLURAL: &'static str;

    fn id(record: &Self::Record) -> Self::Id;

    /// Form contents for editing an existing record
    fn draft(record: &Self::Record) -> Self::Draft;

    async fn list(&self) -> storage::Result<Vec<Self::Record>>;

    async fn create(&self, draft: Self::Draft) -> storage::Result<Self::Record>;

    /// Success means the write landed; the caller re-fetches to see the result.
    async fn update(&self, id: &Self::Id, draft: Self::Draft) -> storage::Result<()>;

    async fn delete(&self, id: &Self::Id) -> storage::Result<()>;
}

/// Blocking yes/no prompt shown before destructive actions
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Create/edit dialog state
#[derive(Debug, Clone, PartialEq)]
pub enum Editor<I, D> {
    Idle,
    /// Dialog open; `id` is set when editing an existing record
    Editing { id: Option<I>, draft: D },
    Submitting { id: Option<I>, draft: D },
}

impl<I, D> Editor<I, D> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

pub struct CrudSync<R: CrudResource> {
    resource: R,
    items: Vec<R::Record>,
    loading: bool,
    editor: Editor<R::Id, R::Draft>,
    notifications: Notifier,
}

impl<R: CrudResource> CrudSync<R> {
    pub fn new(resource: R) -> Self {
        Self {
            resource,
            items: Vec::new(),
            loading: false,
            editor: Editor::Idle,
            notifications: Notifier::default(),
        }
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    pub fn items(&self) -> &[R::Record] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn editor(&self) -> &Editor<R::Id, R::Draft> {
        &self.editor
    }

    pub fn notifications(&mut self) -> &mut Notifier {
        &mut self.notifications
    }

    /// Replace the local list with the store's. On failure the previous list stays.
    pub async fn refresh(&mut self) -> WebResult<()> {
        self.loading = true;
        let result = self.resource.list().await;
        self.loading = false;

        match result {
            Ok(items) => {
                info!("Loaded {} {}", items.len(), R::PLURAL);
                self.items = items;
                Ok(())
            }
            Err(e) => {
                let err = WebError::Fetch(e);
                self.notifications
                    .push(err.notification(&format!("Failed to fetch {}", R::PLURAL)));
                Err(err)
            }
        }
    }

    pub fn open_create(&mut self) {
        self.editor = Editor::Editing {
            id: None,
            draft: R::Draft::default(),
        };
    }

    pub fn open_edit(&mut self, record: &R::Record) {
        self.editor = Editor::Editing {
            id: Some(R::id(record)),
            draft: R::draft(record),
        };
    }

    /// Close the dialog and throw the draft away
    pub fn close_editor(&mut self) {
        self.editor = Editor::Idle;
    }

    pub fn draft(&self) -> Option<&R::Draft> {
        match &self.editor {
            Editor::Editing { draft, .. } | Editor::Submitting { draft, .. } => Some(draft),
            Editor::Idle => None,
        }
    }

    /// Only an open, not yet submitted dialog can be edited
    pub fn draft_mut(&mut self) -> Option<&mut R::Draft> {
        match &mut self.editor {
            Editor::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Validate and persist the open draft, returning the saved record's id.
    ///
    /// On success the dialog closes and the list is re-fetched. On failure the
    /// dialog stays open with the draft untouched so the admin can retry.
    /// Failure is only reported when the write itself did not happen; a
    /// failed re-fetch afterwards gets its own notification.
    pub async fn submit(&mut self) -> WebResult<R::Id> {
        let (id, draft) = match mem::replace(&mut self.editor, Editor::Idle) {
            Editor::Editing { id, draft } => (id, draft),
            other => {
                self.editor = other;
                warn!("Submit ignored: no {} form is open", R::SINGULAR);
                return Err(WebError::BadRequest(format!(
                    "No {} form is open",
                    R::SINGULAR
                )));
            }
        };

        if let Err(errors) = draft.validate() {
            self.editor = Editor::Editing { id, draft };
            let err = WebError::Validation(errors);
            self.notifications.push(err.notification(""));
            return Err(err);
        }

        self.editor = Editor::Submitting {
            id: id.clone(),
            draft: draft.clone(),
        };

        let (result, verb, failure) = match &id {
            Some(id) => (
                self.resource
                    .update(id, draft.clone())
                    .await
                    .map(|()| id.clone()),
                "updated",
                format!("Failed to update {}", R::SINGULAR),
            ),
            None => (
                self.resource
                    .create(draft.clone())
                    .await
                    .map(|record| R::id(&record)),
                "added",
                format!("Failed to add {}", R::SINGULAR),
            ),
        };

        match result {
            Ok(saved) => {
                info!("{} {} {}", capitalize(R::SINGULAR), saved, verb);
                self.notifications.push(Notification::success(format!(
                    "{} {} successfully",
                    capitalize(R::SINGULAR),
                    verb
                )));
                self.editor = Editor::Idle;
                // A failed re-fetch has already been reported
                let _ = self.refresh().await;
                Ok(saved)
            }
            Err(e) => {
                self.editor = Editor::Editing { id, draft };
                let err = WebError::Mutation(e);
                self.notifications.push(err.notification(&failure));
                Err(err)
            }
        }
    }

    /// Delete after the admin confirms. Returns `false` when they declined.
    pub async fn delete(&mut self, id: &R::Id, confirm: &dyn Confirm) -> WebResult<bool> {
        let question = format!("Are you sure you want to delete this {}?", R::SINGULAR);
        if !confirm.confirm(&question) {
            return Ok(false);
        }

        if let Err(e) = self.resource.delete(id).await {
            let err = WebError::Mutation(e);
            self.notifications
                .push(err.notification(&format!("Failed to delete {}", R::SINGULAR)));
            return Err(err);
        }

        info!("{} {} deleted", capitalize(R::SINGULAR), id);
        self.notifications.push(Notification::success(format!(
            "{} deleted successfully",
            capitalize(R::SINGULAR)
        )));
        let _ = self.refresh().await;
        Ok(true)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use storage::StorageError;
    use validator::Validate;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: u32,
        text: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Validate)]
    struct NoteDraft {
        #[validate(length(min = 1))]
        text: String,
    }

    #[derive(Default)]
    struct Notes {
        rows: Mutex<Vec<Note>>,
        fail_writes: Mutex<bool>,
        fail_lists: Mutex<bool>,
        lists: Mutex<usize>,
    }

    impl Notes {
        fn writes_fail(&self) -> storage::Result<()> {
            if *self.fail_writes.lock().unwrap() {
                Err(StorageError::Unavailable("down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CrudResource for Notes {
        type Record = Note;
        type Draft = NoteDraft;
        type Id = u32;

        const SINGULAR: &'static str = "note";
        const PLURAL: &'static str = "notes";

        fn id(record: &Note) -> u32 {
            record.id
        }

        fn draft(record: &Note) -> NoteDraft {
            NoteDraft {
                text: record.text.clone(),
            }
        }

        async fn list(&self) -> storage::Result<Vec<Note>> {
            *self.lists.lock().unwrap() += 1;
            if *self.fail_lists.lock().unwrap() {
                return Err(StorageError::Unavailable("down".to_string()));
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn create(&self, draft: NoteDraft) -> storage::Result<Note> {
            self.writes_fail()?;
            let mut rows = self.rows.lock().unwrap();
            let note = Note {
                id: rows.len() as u32 + 1,
                text: draft.text,
            };
            rows.push(note.clone());
            Ok(note)
        }

        async fn update(&self, id: &u32, draft: NoteDraft) -> storage::Result<()> {
            self.writes_fail()?;
            let mut rows = self.rows.lock().unwrap();
            let note = rows
                .iter_mut()
                .find(|n| n.id == *id)
                .ok_or(StorageError::NotFound)?;
            note.text = draft.text;
            Ok(())
        }

        async fn delete(&self, id: &u32) -> storage::Result<()> {
            self.writes_fail()?;
            self.rows.lock().unwrap().retain(|n| n.id != *id);
            Ok(())
        }
    }

    fn yes(_: &str) -> bool {
        true
    }

    #[tokio::test]
    async fn test_create_refetches_and_closes() {
        let mut sync = CrudSync::new(Notes::default());
        sync.open_create();
        sync.draft_mut().unwrap().text = "hello".to_string();

        let id = sync.submit().await.unwrap();

        assert_eq!(
            sync.items(),
            &[Note {
                id,
                text: "hello".to_string()
            }]
        );
        assert_eq!(*sync.editor(), Editor::Idle);
        assert_eq!(*sync.resource().lists.lock().unwrap(), 1);
        assert_eq!(
            sync.notifications().latest().unwrap().description,
            "Note added successfully"
        );
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_resource() {
        let mut sync = CrudSync::new(Notes::default());
        sync.open_create();

        let err = sync.submit().await.unwrap_err();

        assert!(err.is_validation());
        assert!(sync.resource().rows.lock().unwrap().is_empty());
        assert_eq!(*sync.resource().lists.lock().unwrap(), 0);
        assert!(matches!(sync.editor(), Editor::Editing { id: None, .. }));
    }

    #[tokio::test]
    async fn test_failed_update_keeps_draft_for_retry() {
        let mut sync = CrudSync::new(Notes::default());
        sync.open_create();
        sync.draft_mut().unwrap().text = "first".to_string();
        sync.submit().await.unwrap();
        let note = sync.items()[0].clone();

        sync.open_edit(&note);
        sync.draft_mut().unwrap().text = "second".to_string();
        *sync.resource().fail_writes.lock().unwrap() = true;

        assert!(matches!(sync.submit().await, Err(WebError::Mutation(_))));
        assert_eq!(sync.draft().unwrap().text, "second");
        assert_eq!(sync.items()[0].text, "first");
        assert_eq!(
            sync.notifications().latest().unwrap().description,
            "Failed to update note"
        );

        *sync.resource().fail_writes.lock().unwrap() = false;
        assert_eq!(sync.submit().await.unwrap(), note.id);
        assert_eq!(sync.items()[0].text, "second");
    }

    #[tokio::test]
    async fn test_saved_update_is_not_reported_failed_when_refetch_fails() {
        let mut sync = CrudSync::new(Notes::default());
        sync.open_create();
        sync.draft_mut().unwrap().text = "first".to_string();
        sync.submit().await.unwrap();
        let note = sync.items()[0].clone();

        sync.open_edit(&note);
        sync.draft_mut().unwrap().text = "second".to_string();
        *sync.resource().fail_lists.lock().unwrap() = true;

        assert_eq!(sync.submit().await.unwrap(), note.id);
        assert_eq!(*sync.editor(), Editor::Idle);
        assert_eq!(sync.resource().rows.lock().unwrap()[0].text, "second");

        let descriptions: Vec<String> = sync
            .notifications()
            .drain()
            .into_iter()
            .map(|n| n.description)
            .collect();
        assert_eq!(
            descriptions[descriptions.len() - 2..],
            ["Note updated successfully", "Failed to fetch notes"]
        );
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut sync = CrudSync::new(Notes::default());
        sync.open_create();
        sync.draft_mut().unwrap().text = "keep?".to_string();
        let id = sync.submit().await.unwrap();

        let asked = Mutex::new(Vec::new());
        let decline = |question: &str| {
            asked.lock().unwrap().push(question.to_string());
            false
        };
        assert!(!sync.delete(&id, &decline).await.unwrap());
        assert_eq!(sync.items().len(), 1);
        assert_eq!(
            asked.lock().unwrap().as_slice(),
            ["Are you sure you want to delete this note?"]
        );

        assert!(sync.delete(&id, &yes).await.unwrap());
        assert!(sync.items().is_empty());
    }

    #[tokio::test]
    async fn test_submit_without_open_form() {
        let mut sync = CrudSync::new(Notes::default());
        assert!(matches!(sync.submit().await, Err(WebError::BadRequest(_))));
        assert_eq!(*sync.editor(), Editor::Idle);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("team member"), "Team member");
        assert_eq!(capitalize(""), "");
    }
}
