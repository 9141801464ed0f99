//! Row types bridging Postgres column types to the domain structs
//! (BIGINT counters come back as i64, JSONB lists as `Json<Vec<String>>`).

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use blabz_common::{Author, ProcessedPost, Project};

#[derive(sqlx::FromRow)]
pub struct AuthorRow {
    pub id: Uuid,
    pub x_user_id: String,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub followers: i64,
    pub following: i64,
    pub wallet_address: Option<String>,
    pub developer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author {
            id: row.id,
            x_user_id: row.x_user_id,
            handle: row.handle,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            followers: row.followers.max(0) as u64,
            following: row.following.max(0) as u64,
            wallet_address: row.wallet_address,
            developer_id: row.developer_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub keywords: Json<Vec<String>>,
    pub metadata: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            name: row.name,
            keywords: row.keywords.0,
            metadata: row.metadata.0,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct PostRow {
    pub id: String,
    pub author_x_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub reshares: i64,
    pub quote_shares: i64,
    pub replies: i64,
    pub projects: Json<Vec<String>>,
    pub score: i32,
    pub reward_per_project: f64,
    pub total_reward: f64,
    pub hashtags: Json<Vec<String>>,
    pub processed_at: DateTime<Utc>,
}

impl From<PostRow> for ProcessedPost {
    fn from(row: PostRow) -> Self {
        ProcessedPost {
            id: row.id,
            author_x_id: row.author_x_id,
            text: row.text,
            created_at: row.created_at,
            likes: row.likes.max(0) as u64,
            reshares: row.reshares.max(0) as u64,
            quote_shares: row.quote_shares.max(0) as u64,
            replies: row.replies.max(0) as u64,
            projects: row.projects.0,
            score: row.score,
            reward_per_project: row.reward_per_project,
            total_reward: row.total_reward,
            hashtags: row.hashtags.0,
            processed_at: row.processed_at,
        }
    }
}
