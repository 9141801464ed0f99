use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Reference Types ---

/// How a post refers to another post. Original posts carry no reference at
/// all (`Option<ReferenceKind>` is `None` on the candidate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Quoted,
    RepliedTo,
    Retweeted,
    Other,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Quoted => write!(f, "quoted"),
            ReferenceKind::RepliedTo => write!(f, "replied_to"),
            ReferenceKind::Retweeted => write!(f, "retweeted"),
            ReferenceKind::Other => write!(f, "other"),
        }
    }
}

impl ReferenceKind {
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "quoted" => Self::Quoted,
            "replied_to" => Self::RepliedTo,
            "retweeted" => Self::Retweeted,
            _ => Self::Other,
        }
    }
}

// --- Author ---

/// An X account we track posts for. Upserted on every successful profile
/// fetch; `x_user_id` and `handle` are both unique keys. The wallet and
/// developer identifiers are linked elsewhere and pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub x_user_id: String,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub wallet_address: Option<String>,
    pub developer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Project ---

/// A tracked topic that posts earn rewards for mentioning. `name` is
/// canonical uppercase and unique; keywords compare lowercase. Created and
/// edited by the configuration endpoint, read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub keywords: Vec<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Build a project with the name/keyword normalization invariants applied.
    pub fn new(name: &str, keywords: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_uppercase(),
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            metadata: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    /// Every term that counts as a mention of this project, lowercased:
    /// the project name plus all keywords. Keywords are lowercased here,
    /// not just in `new` — rows written by the configuration endpoint may
    /// carry any casing.
    pub fn terms(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.name.to_lowercase())
            .chain(self.keywords.iter().map(|k| k.to_lowercase()))
    }
}

// --- Posts ---

/// A raw post fetched from the source, not yet evaluated. Engagement
/// counters are fully populated at the client boundary (zero when the
/// upstream payload omits them). Exists only during one pipeline pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePost {
    pub id: String,
    pub author_x_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    pub reshares: u64,
    pub quote_shares: u64,
    pub replies: u64,
    pub reference: Option<ReferenceKind>,
}

/// A post that passed every filter and matched at least one project.
/// Durable, keyed by post id, written exactly once per id (idempotent
/// upsert — re-processing converges to the same record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedPost {
    pub id: String,
    pub author_x_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    pub reshares: u64,
    pub quote_shares: u64,
    pub replies: u64,
    /// Canonical names of every matched project (≥ 1).
    pub projects: Vec<String>,
    /// Quality score in [1, 100].
    pub score: i32,
    /// Blabz per matched project, rounded to 4 decimal places.
    pub reward_per_project: f64,
    /// `reward_per_project * projects.len()`, rounded to 4 decimal places.
    pub total_reward: f64,
    pub hashtags: Vec<String>,
    pub processed_at: DateTime<Utc>,
}

/// A marker that a post id has been evaluated — matched or not. Written for
/// every exclusion and every processed post, so overlapping fetch windows
/// never re-evaluate the same post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub post_id: String,
    pub evaluated_at: DateTime<Utc>,
}

// --- Categorized output ---

/// One row of the categorized feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    pub reshares: u64,
    pub quote_shares: u64,
    pub score: i32,
    pub reward_per_project: f64,
    pub hashtags: Vec<String>,
}

impl From<&ProcessedPost> for PostSummary {
    fn from(post: &ProcessedPost) -> Self {
        Self {
            id: post.id.clone(),
            text: post.text.clone(),
            created_at: post.created_at,
            likes: post.likes,
            reshares: post.reshares,
            quote_shares: post.quote_shares,
            score: post.score,
            reward_per_project: post.reward_per_project,
            hashtags: post.hashtags.clone(),
        }
    }
}

/// Project name → posts ordered by score, every configured project present
/// even when empty. `degraded` marks cache-only results served while the
/// upstream source is rate-limited; scores and rewards may be stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedFeed {
    pub projects: BTreeMap<String, Vec<PostSummary>>,
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_new_normalizes_name_and_keywords() {
        let p = Project::new("solana", vec!["SOL".to_string(), "Anchor".to_string()]);
        assert_eq!(p.name, "SOLANA");
        assert_eq!(p.keywords, vec!["sol", "anchor"]);
    }

    #[test]
    fn project_terms_include_lowercased_name() {
        let p = Project::new("Base", vec!["onchain".to_string()]);
        let terms: Vec<String> = p.terms().collect();
        assert_eq!(terms, vec!["base", "onchain"]);
    }

    #[test]
    fn terms_lowercase_keywords_that_skipped_new() {
        // Store rows bypass `new`, so `terms` must normalize on read.
        let p = Project {
            id: Uuid::new_v4(),
            name: "SOLANA".to_string(),
            keywords: vec!["SOL".to_string()],
            metadata: serde_json::Value::Null,
            created_at: Utc::now(),
        };
        let terms: Vec<String> = p.terms().collect();
        assert_eq!(terms, vec!["solana", "sol"]);
    }

    #[test]
    fn reference_kind_round_trips_serde_snake_case() {
        let json = serde_json::to_string(&ReferenceKind::RepliedTo).unwrap();
        assert_eq!(json, "\"replied_to\"");
        assert_eq!(ReferenceKind::from_str_loose("replied_to"), ReferenceKind::RepliedTo);
        assert_eq!(ReferenceKind::from_str_loose("something_new"), ReferenceKind::Other);
    }
}
