// Test mocks for the pipeline.
//
// One mock per trait boundary:
// - MockSource (PostSource) — HashMap-based handle/id lookups with a
//   flippable rate-limited switch
// - MemoryAuthorStore / MemoryProjectStore / MemoryPostStore / MemoryLedger —
//   stateful in-memory stores
//
// Plus helpers for building candidates and profiles. No network, no
// database — `cargo test` in seconds.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use blabz_common::store::{AuthorStore, EvaluationLedger, ProcessedPostStore, ProjectStore};
use blabz_common::{Author, BlabzError, CandidatePost, ProcessedPost, Project, ReferenceKind};

use crate::source::{PostSource, SourceAuthor};

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn profile(x_user_id: &str, handle: &str, followers: u64) -> SourceAuthor {
    SourceAuthor {
        x_user_id: x_user_id.to_string(),
        handle: handle.to_string(),
        display_name: handle.to_string(),
        avatar_url: None,
        followers,
        following: 10,
    }
}

pub fn candidate(id: &str, author_x_id: &str, text: &str) -> CandidatePost {
    CandidatePost {
        id: id.to_string(),
        author_x_id: author_x_id.to_string(),
        text: text.to_string(),
        created_at: Utc::now(),
        likes: 0,
        reshares: 0,
        quote_shares: 0,
        replies: 0,
        reference: None,
    }
}

pub fn reply(id: &str, author_x_id: &str, text: &str) -> CandidatePost {
    CandidatePost {
        reference: Some(ReferenceKind::RepliedTo),
        ..candidate(id, author_x_id, text)
    }
}

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

/// HashMap-based source. Unregistered handles return `NotFound`. Flip
/// `set_rate_limited(true)` and every call fails with `RateLimited`,
/// mimicking a locked guard.
#[derive(Default)]
pub struct MockSource {
    authors: HashMap<String, SourceAuthor>,
    posts: HashMap<String, Vec<CandidatePost>>,
    rate_limited: AtomicBool,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_author(mut self, author: SourceAuthor) -> Self {
        self.authors.insert(author.handle.clone(), author);
        self
    }

    pub fn with_posts(mut self, author_x_id: &str, posts: Vec<CandidatePost>) -> Self {
        self.posts.insert(author_x_id.to_string(), posts);
        self
    }

    pub fn set_rate_limited(&self, limited: bool) {
        self.rate_limited.store(limited, Ordering::SeqCst);
    }
}

#[async_trait]
impl PostSource for MockSource {
    async fn fetch_author(&self, handle: &str) -> Result<SourceAuthor, BlabzError> {
        if self.rate_limited.load(Ordering::SeqCst) {
            return Err(BlabzError::RateLimited);
        }
        self.authors
            .get(handle)
            .cloned()
            .ok_or_else(|| BlabzError::NotFound(handle.to_string()))
    }

    async fn fetch_recent_posts(
        &self,
        author_x_id: &str,
        since: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<CandidatePost>, BlabzError> {
        if self.rate_limited.load(Ordering::SeqCst) {
            return Err(BlabzError::RateLimited);
        }
        let posts = self.posts.get(author_x_id).cloned().unwrap_or_default();
        Ok(posts
            .into_iter()
            .filter(|p| p.created_at >= since)
            .take(max_results as usize)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// In-memory stores
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryAuthorStore {
    by_handle: Mutex<HashMap<String, Author>>,
}

impl MemoryAuthorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorStore for MemoryAuthorStore {
    async fn upsert(&self, author: &Author) -> Result<()> {
        let mut by_handle = self.by_handle.lock().unwrap();
        by_handle.insert(author.handle.clone(), author.clone());
        Ok(())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Author>> {
        Ok(self.by_handle.lock().unwrap().get(handle).cloned())
    }
}

pub struct MemoryProjectStore {
    projects: Vec<Project>,
}

impl MemoryProjectStore {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn all(&self) -> Result<Vec<Project>> {
        Ok(self.projects.clone())
    }
}

#[derive(Default)]
pub struct MemoryPostStore {
    by_id: Mutex<HashMap<String, ProcessedPost>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_id.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<ProcessedPost> {
        self.by_id.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl ProcessedPostStore for MemoryPostStore {
    async fn put(&self, post: &ProcessedPost) -> Result<()> {
        let mut by_id = self.by_id.lock().unwrap();
        by_id.insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn for_author_since(
        &self,
        author_x_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ProcessedPost>> {
        let by_id = self.by_id.lock().unwrap();
        let mut posts: Vec<ProcessedPost> = by_id
            .values()
            .filter(|p| p.author_x_id == author_x_id && p.created_at >= since)
            .cloned()
            .collect();
        // Newest first, matching the Postgres ORDER BY.
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EvaluationLedger for MemoryLedger {
    async fn contains(&self, post_id: &str) -> Result<bool> {
        Ok(self.entries.lock().unwrap().contains_key(post_id))
    }

    async fn record(&self, post_id: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.entry(post_id.to_string()).or_insert_with(Utc::now);
        Ok(())
    }

    async fn clear(&self) -> Result<u64> {
        let mut entries = self.entries.lock().unwrap();
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }
}
