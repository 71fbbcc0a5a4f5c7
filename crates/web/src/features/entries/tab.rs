use std::sync::Arc;

use storage::{
    TableStore,
    models::{Competition, CompetitionEntry, EntryStatus},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::notify::{Notification, Notifier};

use super::services;

pub const NO_SELECTION: &str = "Please select a competition to view entries.";
pub const NO_ENTRIES: &str = "No entries found for this competition.";

/// Moderation action available in the entry dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(self) -> EntryStatus {
        match self {
            Self::Approve => EntryStatus::Approved,
            Self::Reject => EntryStatus::Rejected,
        }
    }
}

/// A list fetch tagged with the selection it was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntriesRequest {
    pub generation: u64,
    pub competition_id: Uuid,
}

pub struct EntriesResponse {
    request: EntriesRequest,
    result: storage::Result<Vec<CompetitionEntry>>,
}

impl EntriesResponse {
    pub fn request(&self) -> EntriesRequest {
        self.request
    }
}

/// Admin tab listing the entries of one competition with a moderation dialog.
///
/// Every selection change bumps a generation counter. A list response is
/// only applied when it carries the current generation, so a slow answer for
/// an earlier selection can never replace the entries of the current one.
pub struct EntriesTab {
    store: Arc<dyn TableStore>,
    competitions: Vec<Competition>,
    selected: Option<Uuid>,
    generation: u64,
    entries: Vec<CompetitionEntry>,
    loading: bool,
    details: Option<CompetitionEntry>,
    notifications: Notifier,
}

impl EntriesTab {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            store,
            competitions: Vec::new(),
            selected: None,
            generation: 0,
            entries: Vec::new(),
            loading: false,
            details: None,
            notifications: Notifier::default(),
        }
    }

    pub async fn mount(&mut self) -> WebResult<()> {
        self.load_competitions().await
    }

    /// Competitions for the selector, newest first
    pub async fn load_competitions(&mut self) -> WebResult<()> {
        match services::list_competitions(self.store.as_ref()).await {
            Ok(competitions) => {
                info!("Loaded {} competitions", competitions.len());
                self.competitions = competitions;
                Ok(())
            }
            Err(e) => {
                let err = WebError::Fetch(e);
                self.notifications
                    .push(err.notification("Failed to fetch competitions"));
                Err(err)
            }
        }
    }

    pub fn competitions(&self) -> &[Competition] {
        &self.competitions
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn entries(&self) -> &[CompetitionEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn details(&self) -> Option<&CompetitionEntry> {
        self.details.as_ref()
    }

    pub fn notifications(&mut self) -> &mut Notifier {
        &mut self.notifications
    }

    /// Change the selected competition.
    ///
    /// Returns the fetch to issue, or `None` when the selection was cleared.
    /// Any response still in flight for an earlier selection becomes stale.
    pub fn select_competition(&mut self, competition_id: Option<Uuid>) -> Option<EntriesRequest> {
        self.generation += 1;
        self.selected = competition_id;

        match competition_id {
            Some(competition_id) => {
                self.loading = true;
                Some(EntriesRequest {
                    generation: self.generation,
                    competition_id,
                })
            }
            None => {
                self.loading = false;
                self.entries.clear();
                None
            }
        }
    }

    pub async fn fetch(&self, request: EntriesRequest) -> EntriesResponse {
        let result = services::list_entries(self.store.as_ref(), request.competition_id).await;
        EntriesResponse { request, result }
    }

    /// Apply a fetched list. Returns `false` when the response was stale and dropped.
    pub fn apply(&mut self, response: EntriesResponse) -> bool {
        let EntriesResponse { request, result } = response;

        if request.generation != self.generation || self.selected != Some(request.competition_id) {
            debug!(
                "Discarding entries for competition {} (generation {}, current {})",
                request.competition_id, request.generation, self.generation
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(entries) => {
                info!(
                    "Loaded {} entries for competition {}",
                    entries.len(),
                    request.competition_id
                );
                self.entries = entries;
            }
            Err(e) => {
                let err = WebError::Fetch(e);
                self.notifications
                    .push(err.notification("Failed to fetch entries"));
            }
        }
        true
    }

    /// Select a competition and load its entries
    pub async fn choose_competition(&mut self, competition_id: Option<Uuid>) {
        if let Some(request) = self.select_competition(competition_id) {
            let response = self.fetch(request).await;
            self.apply(response);
        }
    }

    pub fn open_details(&mut self, entry: &CompetitionEntry) {
        self.details = Some(entry.clone());
    }

    pub fn close_details(&mut self) {
        self.details = None;
    }

    /// Whether the dialog's button for `decision` is enabled
    pub fn can_transition(&self, decision: Decision) -> bool {
        self.details
            .as_ref()
            .is_some_and(|entry| entry.status != decision.status())
    }

    fn current_status(&self, id: Uuid) -> Option<EntryStatus> {
        self.details
            .iter()
            .chain(self.entries.iter())
            .find(|entry| entry.id == id)
            .map(|entry| entry.status)
    }

    /// Move an entry to approved or rejected.
    ///
    /// Returns `Ok(false)` without touching the store when the entry already
    /// has the target status. The open dialog shows the new status at once;
    /// the list is re-fetched afterwards.
    pub async fn transition(&mut self, id: Uuid, decision: Decision) -> WebResult<bool> {
        let status = decision.status();
        if self.current_status(id) == Some(status) {
            warn!("Entry {} is already {}", id, status);
            return Ok(false);
        }

        if let Err(e) = services::set_entry_status(self.store.as_ref(), id, status).await {
            let err = WebError::Mutation(e);
            self.notifications
                .push(err.notification("Failed to update entry status"));
            return Err(err);
        }

        info!("Entry {} marked {}", id, status);
        self.notifications
            .push(Notification::success("Entry status updated"));

        if let Some(entry) = self.details.as_mut().filter(|entry| entry.id == id) {
            entry.status = status;
        }

        if self.selected.is_some() {
            self.choose_competition(self.selected).await;
        }
        Ok(true)
    }

    /// Placeholder text for the table, if any
    pub fn empty_state(&self) -> Option<&'static str> {
        match self.selected {
            None => Some(NO_SELECTION),
            Some(_) if !self.loading && self.entries.is_empty() => Some(NO_ENTRIES),
            Some(_) => None,
        }
    }
}
