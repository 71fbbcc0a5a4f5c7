use std::sync::Arc;
use std::time::Duration;

use storage::{TableStore, models::TeamMember};
use tracing::{error, info};

use crate::animation::{HoverOptions, RevealOptions};

use super::services;

pub const HEADING: &str = "Our Leadership Team";

/// Extra reveal delay per card, so cards appear one after another
const STAGGER: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub struct RosterCard {
    pub member: TeamMember,
    pub reveal: RevealOptions,
    pub hover: HoverOptions,
}

/// What the public team section should paint
#[derive(Debug, Clone, PartialEq)]
pub enum RosterSection {
    Loading,
    /// Nothing to show; the section is left out of the page entirely
    Hidden,
    Members {
        heading: RevealOptions,
        cards: Vec<RosterCard>,
    },
}

/// Public list of active team members.
///
/// Fetches once per mount. A failed fetch is logged and the section is
/// simply not shown; visitors never see an error.
pub struct RosterView {
    store: Arc<dyn TableStore>,
    members: Vec<TeamMember>,
    loading: bool,
    mounted: bool,
}

impl RosterView {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            store,
            members: Vec::new(),
            loading: true,
            mounted: false,
        }
    }

    pub async fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        match services::load_active_members(self.store.as_ref()).await {
            Ok(members) => {
                self.members = members.into_iter().filter(TeamMember::is_active).collect();
                info!("Loaded {} active team members", self.members.len());
            }
            Err(e) => error!("Error fetching team members: {:?}", e),
        }

        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn render(&self) -> RosterSection {
        if self.loading {
            return RosterSection::Loading;
        }
        if self.members.is_empty() {
            return RosterSection::Hidden;
        }

        let cards = self
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| RosterCard {
                member: member.clone(),
                reveal: RevealOptions::default().delayed(STAGGER * (index as u32 + 1)),
                hover: HoverOptions::default(),
            })
            .collect();

        RosterSection::Members {
            heading: RevealOptions::default(),
            cards,
        }
    }
}
