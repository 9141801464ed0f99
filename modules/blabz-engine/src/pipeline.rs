//! Pipeline driver: fetch → filter → match → score → store → categorize.
//!
//! One invocation handles one author's post window, sequentially, each
//! candidate run to completion (processed or ledgered) before the next.
//! A rate-limited upstream at either fetch point redirects the whole run
//! to the cache-only path; every other source failure surfaces to the
//! caller. Filter, matcher and scorer stages never fail.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use blabz_common::{
    extract_hashtags, Author, BlabzError, CandidatePost, CategorizedFeed, PipelinePolicy,
    ProcessedPost, Project,
};

use crate::categorizer::categorize;
use crate::filter::{content_verdict, ExclusionReason, Verdict};
use crate::matcher::matching_projects;
use crate::scorer::{score_post, total_reward};
use blabz_common::store::{AuthorStore, EvaluationLedger, ProcessedPostStore, ProjectStore};

use crate::source::{PostSource, SourceAuthor};

/// Counters for one pipeline run, logged at completion.
#[derive(Debug, Default)]
pub struct RunStats {
    pub fetched: u32,
    pub unsupported_reference: u32,
    pub too_short: u32,
    pub mention_heavy: u32,
    pub already_evaluated: u32,
    pub no_project_match: u32,
    pub processed: u32,
}

impl RunStats {
    fn exclude(&mut self, reason: ExclusionReason) {
        match reason {
            ExclusionReason::UnsupportedReference => self.unsupported_reference += 1,
            ExclusionReason::TooShort => self.too_short += 1,
            ExclusionReason::MentionHeavy => self.mention_heavy += 1,
            ExclusionReason::AlreadyEvaluated => self.already_evaluated += 1,
            ExclusionReason::NoProjectMatch => self.no_project_match += 1,
        }
    }
}

pub struct BlabzPipeline {
    source: Arc<dyn PostSource>,
    authors: Arc<dyn AuthorStore>,
    projects: Arc<dyn ProjectStore>,
    posts: Arc<dyn ProcessedPostStore>,
    ledger: Arc<dyn EvaluationLedger>,
    policy: PipelinePolicy,
}

impl BlabzPipeline {
    pub fn new(
        source: Arc<dyn PostSource>,
        authors: Arc<dyn AuthorStore>,
        projects: Arc<dyn ProjectStore>,
        posts: Arc<dyn ProcessedPostStore>,
        ledger: Arc<dyn EvaluationLedger>,
        policy: PipelinePolicy,
    ) -> Self {
        Self {
            source,
            authors,
            projects,
            posts,
            ledger,
            policy,
        }
    }

    /// The single operation exposed to the endpoint layer: ingest the
    /// author's recent window and return their posts grouped by project.
    pub async fn categorized_posts(&self, handle: &str) -> Result<CategorizedFeed, BlabzError> {
        let handle = normalize_handle(handle)?;
        let since = self.policy.lookback_start(Utc::now());
        let projects = self.projects.all().await.map_err(storage)?;

        let profile = match self.source.fetch_author(&handle).await {
            Ok(profile) => profile,
            Err(BlabzError::RateLimited) => {
                return self.cached_feed(&handle, &projects).await;
            }
            Err(other) => return Err(other),
        };

        let author = self.upsert_author(profile).await?;

        let candidates = match self
            .source
            .fetch_recent_posts(&author.x_user_id, since, self.policy.page_size)
            .await
        {
            Ok(candidates) => candidates,
            Err(BlabzError::RateLimited) => {
                return self.cached_feed(&handle, &projects).await;
            }
            Err(other) => return Err(other),
        };

        let mut stats = RunStats {
            fetched: candidates.len() as u32,
            ..RunStats::default()
        };

        let mut fresh: Vec<ProcessedPost> = Vec::new();
        for candidate in candidates {
            if let Some(processed) = self
                .evaluate(candidate, &projects, author.followers, &mut stats)
                .await?
            {
                fresh.push(processed);
            }
        }

        let stored = self
            .posts
            .for_author_since(&author.x_user_id, since)
            .await
            .map_err(storage)?;

        info!(
            handle = author.handle.as_str(),
            fetched = stats.fetched,
            processed = stats.processed,
            unsupported_reference = stats.unsupported_reference,
            too_short = stats.too_short,
            mention_heavy = stats.mention_heavy,
            already_evaluated = stats.already_evaluated,
            no_project_match = stats.no_project_match,
            "Pipeline run complete"
        );

        // Fresh results lead so first-occurrence dedup prefers them over
        // the stored copies written moments ago.
        let combined = fresh.iter().chain(stored.iter());
        Ok(CategorizedFeed {
            projects: categorize(&projects, combined),
            degraded: false,
        })
    }

    /// Purge the evaluation ledger so the next runs re-evaluate everything
    /// (used after a filter-rule change). Returns the entry count removed.
    pub async fn clear_ledger(&self) -> Result<u64, BlabzError> {
        let removed = self.ledger.clear().await.map_err(storage)?;
        info!(removed, "Evaluation ledger cleared");
        Ok(removed)
    }

    /// Run one candidate through stages 1–5. Every branch either stores a
    /// processed post or leaves a ledger entry; nothing here fails the run
    /// except the store boundary itself.
    async fn evaluate(
        &self,
        candidate: CandidatePost,
        projects: &[Project],
        followers: u64,
        stats: &mut RunStats,
    ) -> Result<Option<ProcessedPost>, BlabzError> {
        // Stages 1–3: cheap content exclusions.
        if let Verdict::Excluded(reason) = content_verdict(&candidate, &self.policy) {
            debug!(post_id = candidate.id.as_str(), %reason, "Candidate excluded");
            stats.exclude(reason);
            self.ledger.record(&candidate.id).await.map_err(storage)?;
            return Ok(None);
        }

        // Stage 4: already evaluated on a previous run — skip silently,
        // the ledger entry exists.
        if self.ledger.contains(&candidate.id).await.map_err(storage)? {
            stats.exclude(ExclusionReason::AlreadyEvaluated);
            return Ok(None);
        }

        // Stage 5: must mention at least one configured project.
        let matched = matching_projects(&candidate.text, projects);
        if matched.is_empty() {
            debug!(post_id = candidate.id.as_str(), "No project match");
            stats.exclude(ExclusionReason::NoProjectMatch);
            self.ledger.record(&candidate.id).await.map_err(storage)?;
            return Ok(None);
        }

        let quality = score_post(&candidate, followers, &self.policy);
        let processed = ProcessedPost {
            id: candidate.id.clone(),
            author_x_id: candidate.author_x_id,
            text: candidate.text.clone(),
            created_at: candidate.created_at,
            likes: candidate.likes,
            reshares: candidate.reshares,
            quote_shares: candidate.quote_shares,
            replies: candidate.replies,
            total_reward: total_reward(quality, matched.len()),
            projects: matched,
            score: quality.score,
            reward_per_project: quality.reward_per_project,
            hashtags: extract_hashtags(&candidate.text),
            processed_at: Utc::now(),
        };

        self.posts.put(&processed).await.map_err(storage)?;
        self.ledger.record(&candidate.id).await.map_err(storage)?;
        stats.processed += 1;
        Ok(Some(processed))
    }

    /// Degraded mode: the upstream is rate-limited, serve from the store.
    /// Stored posts were filtered and matched at write time, so they go
    /// straight to the categorizer. No cached author means we cannot tell
    /// "no data" from "stale data" — that is ServiceUnavailable.
    async fn cached_feed(
        &self,
        handle: &str,
        projects: &[Project],
    ) -> Result<CategorizedFeed, BlabzError> {
        let author = self
            .authors
            .find_by_handle(handle)
            .await
            .map_err(storage)?
            .ok_or_else(|| BlabzError::ServiceUnavailable(handle.to_string()))?;

        let since = self.policy.lookback_start(Utc::now());
        let stored = self
            .posts
            .for_author_since(&author.x_user_id, since)
            .await
            .map_err(storage)?;

        warn!(
            handle,
            cached = stored.len(),
            "Upstream rate limited, serving cache-only feed"
        );

        Ok(CategorizedFeed {
            projects: categorize(projects, stored.iter()),
            degraded: true,
        })
    }

    /// Merge the fetched profile into the stored author record. Store
    /// identity and the linked wallet/developer ids survive the refresh.
    async fn upsert_author(&self, profile: SourceAuthor) -> Result<Author, BlabzError> {
        let now = Utc::now();
        let author = match self
            .authors
            .find_by_handle(&profile.handle)
            .await
            .map_err(storage)?
        {
            Some(existing) => Author {
                x_user_id: profile.x_user_id,
                handle: profile.handle,
                display_name: profile.display_name,
                avatar_url: profile.avatar_url,
                followers: profile.followers,
                following: profile.following,
                updated_at: now,
                ..existing
            },
            None => Author {
                id: Uuid::new_v4(),
                x_user_id: profile.x_user_id,
                handle: profile.handle,
                display_name: profile.display_name,
                avatar_url: profile.avatar_url,
                followers: profile.followers,
                following: profile.following,
                wallet_address: None,
                developer_id: None,
                created_at: now,
                updated_at: now,
            },
        };
        self.authors.upsert(&author).await.map_err(storage)?;
        Ok(author)
    }
}

/// Reject malformed handles before the pipeline starts. Accepts an
/// optional leading `@`; the rest must be 1–15 word characters.
pub fn normalize_handle(raw: &str) -> Result<String, BlabzError> {
    let handle = raw.trim().trim_start_matches('@');
    let valid = !handle.is_empty()
        && handle.len() <= 15
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(BlabzError::Validation(format!("invalid handle: {raw:?}")));
    }
    Ok(handle.to_string())
}

fn storage(err: anyhow::Error) -> BlabzError {
    BlabzError::Storage(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_normalization_strips_at_and_whitespace() {
        assert_eq!(normalize_handle(" @alice ").unwrap(), "alice");
        assert_eq!(normalize_handle("bob_123").unwrap(), "bob_123");
    }

    #[test]
    fn bad_handles_are_rejected() {
        assert!(normalize_handle("").is_err());
        assert!(normalize_handle("@").is_err());
        assert!(normalize_handle("way_too_long_for_x_handles").is_err());
        assert!(normalize_handle("has spaces").is_err());
        assert!(normalize_handle("semi;colon").is_err());
    }
}
