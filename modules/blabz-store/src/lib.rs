//! Postgres implementations of the blabz store traits.
//!
//! Plain sqlx queries against four tables: authors, projects,
//! processed_posts, evaluation_ledger. All writes are idempotent upserts
//! (`ON CONFLICT`); the pipeline's scorer is deterministic, so concurrent
//! runs touching the same post id converge regardless of arrival order.

mod rows;
mod store;

pub use store::{PgAuthorStore, PgLedger, PgPostStore, PgProjectStore};

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create the schema if it does not exist yet. Safe to run on every start.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id             UUID         PRIMARY KEY,
            x_user_id      TEXT         NOT NULL UNIQUE,
            handle         TEXT         NOT NULL UNIQUE,
            display_name   TEXT         NOT NULL,
            avatar_url     TEXT,
            followers      BIGINT       NOT NULL DEFAULT 0,
            following      BIGINT       NOT NULL DEFAULT 0,
            wallet_address TEXT,
            developer_id   TEXT,
            created_at     TIMESTAMPTZ  NOT NULL,
            updated_at     TIMESTAMPTZ  NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id         UUID         PRIMARY KEY,
            name       TEXT         NOT NULL UNIQUE,
            keywords   JSONB        NOT NULL DEFAULT '[]',
            metadata   JSONB        NOT NULL DEFAULT 'null',
            created_at TIMESTAMPTZ  NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS processed_posts (
            id                 TEXT              PRIMARY KEY,
            author_x_id        TEXT              NOT NULL,
            text               TEXT              NOT NULL,
            created_at         TIMESTAMPTZ       NOT NULL,
            likes              BIGINT            NOT NULL DEFAULT 0,
            reshares           BIGINT            NOT NULL DEFAULT 0,
            quote_shares       BIGINT            NOT NULL DEFAULT 0,
            replies            BIGINT            NOT NULL DEFAULT 0,
            projects           JSONB             NOT NULL,
            score              INT               NOT NULL,
            reward_per_project DOUBLE PRECISION  NOT NULL,
            total_reward       DOUBLE PRECISION  NOT NULL,
            hashtags           JSONB             NOT NULL DEFAULT '[]',
            processed_at       TIMESTAMPTZ       NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Window queries read by (author, time).
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_processed_posts_author_created
            ON processed_posts (author_x_id, created_at)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS evaluation_ledger (
            post_id      TEXT         PRIMARY KEY,
            evaluated_at TIMESTAMPTZ  NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("Schema migration complete");
    Ok(())
}
