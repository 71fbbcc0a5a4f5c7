pub mod competition_entry;
pub mod image;
pub mod team_member;
