pub mod error;
pub mod types;

pub use error::{Result, XApiError};
pub use types::{ReferencedTweet, TweetMetrics, UserMetrics, XTweet, XUser};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use types::ApiEnvelope;

const BASE_URL: &str = "https://api.twitter.com/2";

/// Expansion fields requested on every user lookup.
const USER_FIELDS: &str = "public_metrics,profile_image_url";

/// Expansion fields requested on every timeline fetch.
const TWEET_FIELDS: &str = "created_at,public_metrics,referenced_tweets";

/// The v2 timeline endpoint accepts max_results in [5, 100].
const MAX_RESULTS_FLOOR: u32 = 5;
const MAX_RESULTS_CEIL: u32 = 100;

pub struct XApiClient {
    client: reqwest::Client,
    bearer_token: String,
}

impl XApiClient {
    pub fn new(bearer_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            bearer_token,
        }
    }

    /// Look up a user by handle. HTTP 200 with an empty `data` field is how
    /// the v2 API reports an unknown handle, so that maps to `NotFound` too.
    pub async fn user_by_handle(&self, handle: &str) -> Result<XUser> {
        let url = format!(
            "{}/users/by/username/{}?user.fields={}",
            BASE_URL, handle, USER_FIELDS
        );
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        let status = resp.status();
        match status.as_u16() {
            429 => return Err(XApiError::RateLimited),
            404 => return Err(XApiError::NotFound(handle.to_string())),
            s if !status.is_success() => {
                let body = resp.text().await.unwrap_or_default();
                return Err(XApiError::Api {
                    status: s,
                    message: body,
                });
            }
            _ => {}
        }

        let envelope: ApiEnvelope<XUser> = decode(&resp.text().await?)?;
        match envelope.data {
            Some(user) => {
                tracing::debug!(handle, user_id = %user.id, "Resolved X user");
                Ok(user)
            }
            None => Err(XApiError::NotFound(handle.to_string())),
        }
    }

    /// Fetch a user's recent original posts, newest first. Retweets are
    /// excluded server-side; replies and quotes come through and are left
    /// for the caller to classify.
    pub async fn recent_posts(
        &self,
        user_id: &str,
        start_time: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<XTweet>> {
        let max_results = max_results.clamp(MAX_RESULTS_FLOOR, MAX_RESULTS_CEIL);
        let url = format!(
            "{}/users/{}/tweets?max_results={}&start_time={}&exclude=retweets&tweet.fields={}",
            BASE_URL,
            user_id,
            max_results,
            start_time.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            TWEET_FIELDS
        );
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        let status = resp.status();
        match status.as_u16() {
            429 => return Err(XApiError::RateLimited),
            404 => return Err(XApiError::NotFound(user_id.to_string())),
            s if !status.is_success() => {
                let body = resp.text().await.unwrap_or_default();
                return Err(XApiError::Api {
                    status: s,
                    message: body,
                });
            }
            _ => {}
        }

        // An author with no posts in the window returns `data: null`.
        let envelope: ApiEnvelope<Vec<XTweet>> = decode(&resp.text().await?)?;
        let tweets = envelope.data.unwrap_or_default();
        tracing::debug!(user_id, count = tweets.len(), "Fetched recent posts");
        Ok(tweets)
    }
}

/// Decode a response body. A body that is not the expected shape is a
/// `Parse` error, distinct from transport failures.
fn decode<T: DeserializeOwned>(body: &str) -> Result<ApiEnvelope<T>> {
    Ok(serde_json::from_str(body)?)
}
