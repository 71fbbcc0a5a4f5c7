mod competition;
mod competition_entry;
mod team_member;

pub use competition::Competition;
pub use competition_entry::{CompetitionEntry, EntryStatus};
pub use team_member::{ACTIVE_STATUS, TeamMember};
