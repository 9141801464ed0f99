//! Source boundary: the `PostSource` trait plus the guarded X API
//! implementation.
//!
//! Everything past this boundary sees fully-populated candidates — missing
//! engagement counters and absent reference tuples are normalized here, not
//! downstream. The guard is consulted before every call; a locked guard
//! fails fast with `RateLimited` and makes no network call.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use blabz_common::{BlabzError, CandidatePost, ReferenceKind};
use x_client::{XApiClient, XApiError, XTweet};

use crate::guard::CooldownGuard;

/// Profile fields as fetched from the source, before store identity
/// (uuid, wallet linkage) is attached.
#[derive(Debug, Clone)]
pub struct SourceAuthor {
    pub x_user_id: String,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub followers: u64,
    pub following: u64,
}

#[async_trait]
pub trait PostSource: Send + Sync {
    /// Resolve a handle to a profile.
    async fn fetch_author(&self, handle: &str) -> Result<SourceAuthor, BlabzError>;

    /// Fetch the author's recent-post window, newest first, capped at
    /// `max_results`. Reshares are excluded at the source where supported.
    async fn fetch_recent_posts(
        &self,
        author_x_id: &str,
        since: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<CandidatePost>, BlabzError>;
}

/// `PostSource` over the real X API, wrapped by the cooldown guard.
pub struct GuardedSource {
    client: XApiClient,
    guard: Arc<CooldownGuard>,
    cooldown: Duration,
}

impl GuardedSource {
    pub fn new(client: XApiClient, guard: Arc<CooldownGuard>, cooldown: Duration) -> Self {
        Self {
            client,
            guard,
            cooldown,
        }
    }

    fn check_guard(&self) -> Result<(), BlabzError> {
        if self.guard.is_locked() {
            tracing::debug!("Guard locked, skipping upstream call");
            return Err(BlabzError::RateLimited);
        }
        Ok(())
    }

    /// Map a client error into the pipeline taxonomy. An upstream 429 locks
    /// the guard for the cooldown window as a side effect.
    fn map_err(&self, err: XApiError) -> BlabzError {
        match err {
            XApiError::RateLimited => {
                self.guard.lock(self.cooldown);
                BlabzError::RateLimited
            }
            XApiError::NotFound(what) => BlabzError::NotFound(what),
            other => BlabzError::Upstream(other.to_string()),
        }
    }
}

#[async_trait]
impl PostSource for GuardedSource {
    async fn fetch_author(&self, handle: &str) -> Result<SourceAuthor, BlabzError> {
        self.check_guard()?;
        let user = self
            .client
            .user_by_handle(handle)
            .await
            .map_err(|e| self.map_err(e))?;
        Ok(SourceAuthor {
            x_user_id: user.id,
            handle: user.username,
            display_name: user.name,
            avatar_url: user.profile_image_url,
            followers: user.public_metrics.followers_count,
            following: user.public_metrics.following_count,
        })
    }

    async fn fetch_recent_posts(
        &self,
        author_x_id: &str,
        since: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<CandidatePost>, BlabzError> {
        self.check_guard()?;
        let tweets = self
            .client
            .recent_posts(author_x_id, since, max_results)
            .await
            .map_err(|e| self.map_err(e))?;
        Ok(tweets
            .into_iter()
            .map(|t| normalize(t, author_x_id))
            .collect())
    }
}

/// Normalize an upstream tweet into a fully-populated candidate.
/// Posts without a usable timestamp get `now` so window math stays total.
fn normalize(tweet: XTweet, author_x_id: &str) -> CandidatePost {
    let reference = tweet.reference_kind().map(ReferenceKind::from_str_loose);
    CandidatePost {
        id: tweet.id,
        author_x_id: author_x_id.to_string(),
        text: tweet.text,
        created_at: tweet.created_at.unwrap_or_else(Utc::now),
        likes: tweet.public_metrics.like_count,
        reshares: tweet.public_metrics.retweet_count,
        quote_shares: tweet.public_metrics.quote_count,
        replies: tweet.public_metrics.reply_count,
        reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x_client::{ReferencedTweet, TweetMetrics};

    fn tweet(reference: Option<&str>) -> XTweet {
        XTweet {
            id: "1".to_string(),
            text: "hello".to_string(),
            created_at: Some(Utc::now()),
            public_metrics: TweetMetrics::default(),
            referenced_tweets: reference.map(|kind| {
                vec![ReferencedTweet {
                    kind: kind.to_string(),
                    id: "2".to_string(),
                }]
            }),
        }
    }

    #[test]
    fn original_post_normalizes_to_no_reference() {
        let c = normalize(tweet(None), "u1");
        assert_eq!(c.reference, None);
        assert_eq!(c.author_x_id, "u1");
    }

    #[test]
    fn reply_normalizes_to_replied_to() {
        let c = normalize(tweet(Some("replied_to")), "u1");
        assert_eq!(c.reference, Some(ReferenceKind::RepliedTo));
    }

    #[test]
    fn unknown_reference_kind_maps_to_other() {
        let c = normalize(tweet(Some("community_note")), "u1");
        assert_eq!(c.reference, Some(ReferenceKind::Other));
    }
}
