use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Wrapper for X API v2 responses. A lookup that finds nothing returns
/// HTTP 200 with `data` absent and a populated `errors` array, so both
/// fields are optional here and the client decides what that means.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<ApiProblem>,
}

/// A partial-error entry from the `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiProblem {
    pub title: Option<String>,
    pub detail: Option<String>,
}

/// Follower/following counters nested inside a user object.
/// All counters default to zero when the payload omits them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetrics {
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub tweet_count: u64,
}

/// A user object from `GET /2/users/by/username/:username`.
#[derive(Debug, Clone, Deserialize)]
pub struct XUser {
    pub id: String,
    pub name: String,
    pub username: String,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub public_metrics: UserMetrics,
}

/// Engagement counters nested inside a tweet object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetMetrics {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

/// An entry from a tweet's `referenced_tweets` array
/// (`type` is one of "replied_to", "quoted", "retweeted").
#[derive(Debug, Clone, Deserialize)]
pub struct ReferencedTweet {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// A single tweet from `GET /2/users/:id/tweets`.
#[derive(Debug, Clone, Deserialize)]
pub struct XTweet {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub public_metrics: TweetMetrics,
    pub referenced_tweets: Option<Vec<ReferencedTweet>>,
}

impl XTweet {
    /// The first referenced-tweet kind, if any. Original posts have none.
    pub fn reference_kind(&self) -> Option<&str> {
        self.referenced_tweets
            .as_deref()
            .and_then(|refs| refs.first())
            .map(|r| r.kind.as_str())
    }
}
