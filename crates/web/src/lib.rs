//! Headless state for the public team section and the admin tabs.
//!
//! Components take their store collaborators at construction and expose
//! plain state plus async operations; painting is left to the host.

pub mod animation;
pub mod config;
pub mod crud;
pub mod error;
pub mod features;
pub mod notify;

pub use config::{Config, Stores};
pub use error::{WebError, WebResult};
