use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use blabz_common::store::{AuthorStore, EvaluationLedger, ProcessedPostStore, ProjectStore};
use blabz_common::{Author, ProcessedPost, Project};

use crate::rows::{AuthorRow, PostRow, ProjectRow};

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgAuthorStore {
    pool: PgPool,
}

impl PgAuthorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorStore for PgAuthorStore {
    async fn upsert(&self, author: &Author) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO authors (id, x_user_id, handle, display_name, avatar_url,
                                 followers, following, wallet_address, developer_id,
                                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (x_user_id) DO UPDATE SET
                handle = excluded.handle,
                display_name = excluded.display_name,
                avatar_url = excluded.avatar_url,
                followers = excluded.followers,
                following = excluded.following,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(author.id)
        .bind(&author.x_user_id)
        .bind(&author.handle)
        .bind(&author.display_name)
        .bind(&author.avatar_url)
        .bind(author.followers as i64)
        .bind(author.following as i64)
        .bind(&author.wallet_address)
        .bind(&author.developer_id)
        .bind(author.created_at)
        .bind(author.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT id, x_user_id, handle, display_name, avatar_url,
                   followers, following, wallet_address, developer_id,
                   created_at, updated_at
            FROM authors
            WHERE handle = $1
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Author::from))
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn all(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, keywords, metadata, created_at
            FROM projects
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Processed posts
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessedPostStore for PgPostStore {
    async fn put(&self, post: &ProcessedPost) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO processed_posts (id, author_x_id, text, created_at,
                                         likes, reshares, quote_shares, replies,
                                         projects, score, reward_per_project,
                                         total_reward, hashtags, processed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE SET
                likes = excluded.likes,
                reshares = excluded.reshares,
                quote_shares = excluded.quote_shares,
                replies = excluded.replies,
                projects = excluded.projects,
                score = excluded.score,
                reward_per_project = excluded.reward_per_project,
                total_reward = excluded.total_reward,
                hashtags = excluded.hashtags,
                processed_at = excluded.processed_at
            "#,
        )
        .bind(&post.id)
        .bind(&post.author_x_id)
        .bind(&post.text)
        .bind(post.created_at)
        .bind(post.likes as i64)
        .bind(post.reshares as i64)
        .bind(post.quote_shares as i64)
        .bind(post.replies as i64)
        .bind(Json(&post.projects))
        .bind(post.score)
        .bind(post.reward_per_project)
        .bind(post.total_reward)
        .bind(Json(&post.hashtags))
        .bind(post.processed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn for_author_since(
        &self,
        author_x_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ProcessedPost>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_x_id, text, created_at,
                   likes, reshares, quote_shares, replies,
                   projects, score, reward_per_project,
                   total_reward, hashtags, processed_at
            FROM processed_posts
            WHERE author_x_id = $1 AND created_at >= $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_x_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ProcessedPost::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Evaluation ledger
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvaluationLedger for PgLedger {
    async fn contains(&self, post_id: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM evaluation_ledger WHERE post_id = $1)",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn record(&self, post_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO evaluation_ledger (post_id)
            VALUES ($1)
            ON CONFLICT (post_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM evaluation_ledger")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
