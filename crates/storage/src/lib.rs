pub mod backend;
pub mod dto;
pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repository;
pub mod rest;

pub use backend::{ObjectStore, TableStore};
pub use error::{Result, StorageError};
pub use memory::MemoryStore;
pub use postgres::Database;
pub use rest::RestClient;
