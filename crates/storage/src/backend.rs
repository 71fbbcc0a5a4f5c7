use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::query::Query;

pub const TEAMS: &str = "teams";
pub const COMPETITIONS: &str = "competitions";
pub const COMPETITION_ENTRIES: &str = "competition_entries";
pub const DEFAULT_IMAGE_BUCKET: &str = "team-images";

/// Row-level access to the managed relational store.
///
/// Rows travel as JSON objects; repositories own the typed view of each table.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>>;

    /// Insert one row and return it as stored, generated columns included
    async fn insert(&self, table: &str, row: Value) -> Result<Value>;

    /// Apply `patch` to the row whose `id` equals `id`, returning the number of affected rows
    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<u64>;

    async fn delete(&self, table: &str, id: &str) -> Result<u64>;
}

/// Binary object storage with publicly resolvable URLs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    /// Derives the public URL without checking that the object exists
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
