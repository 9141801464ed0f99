//! Trait boundaries for durable state.
//!
//! The pipeline never assumes a storage engine — everything it needs is an
//! idempotent `put`/`record` contract plus a couple of window reads.
//! Production wiring lives in `blabz-store` (Postgres); the in-memory
//! versions in the engine's `testing` module make `cargo test` run with
//! no database.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{Author, ProcessedPost, Project};

#[async_trait]
pub trait AuthorStore: Send + Sync {
    /// Idempotent upsert keyed by `x_user_id` (handle is unique too).
    async fn upsert(&self, author: &Author) -> Result<()>;

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Author>>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// All configured projects. Read-only to the pipeline.
    async fn all(&self) -> Result<Vec<Project>>;
}

#[async_trait]
pub trait ProcessedPostStore: Send + Sync {
    /// Idempotent upsert keyed by post id. Concurrent runs over the same id
    /// converge because the scorer is deterministic — last write wins.
    async fn put(&self, post: &ProcessedPost) -> Result<()>;

    /// Stored posts for an author within the lookback window, newest first.
    async fn for_author_since(
        &self,
        author_x_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ProcessedPost>>;
}

#[async_trait]
pub trait EvaluationLedger: Send + Sync {
    async fn contains(&self, post_id: &str) -> Result<bool>;

    /// Mark a post id as evaluated. Recording the same id twice is a no-op.
    async fn record(&self, post_id: &str) -> Result<()>;

    /// Empty the ledger (re-processing after a filter-rule change).
    /// Returns how many entries were removed.
    async fn clear(&self) -> Result<u64>;
}
