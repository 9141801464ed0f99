//! Deterministic quality scoring and blabz reward derivation.
//!
//! Pure function of (post, follower count, policy). Bit-identical output
//! for identical inputs — no clock, no randomness, no I/O — which is what
//! makes concurrent last-write-wins upserts safe downstream.

use blabz_common::{CandidatePost, PipelinePolicy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScore {
    /// Integer score in [1, 100].
    pub score: i32,
    /// Blabz per matched project, rounded to 4 decimal places.
    pub reward_per_project: f64,
}

/// Round half away from zero to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Score a post against its author's reach.
///
/// - `length_score = clamp((chars - 50) / 200, 0, 1)`
/// - `engagement_raw = likes + 2*reshares + 3*quote_shares`
/// - `engagement_score = clamp(engagement_raw / max(1, followers), 0, 1)`
/// - `combined = base + length_weight*length_score + engagement_weight*engagement_score`
/// - `score = round(combined * 99) + 1`
pub fn score_post(post: &CandidatePost, followers: u64, policy: &PipelinePolicy) -> QualityScore {
    let chars = post.text.chars().count() as f64;
    let length_score = ((chars - 50.0) / 200.0).clamp(0.0, 1.0);

    let engagement_raw = (post.likes + 2 * post.reshares + 3 * post.quote_shares) as f64;
    let engagement_score = (engagement_raw / followers.max(1) as f64).clamp(0.0, 1.0);

    let combined = policy.base_weight
        + policy.length_weight * length_score
        + policy.engagement_weight * engagement_score;
    // The default weights keep combined well inside [0, 1], but the
    // weights are tunable — the [1, 100] bound holds regardless.
    let score = ((combined * 99.0).round() as i32 + 1).clamp(1, 100);

    QualityScore {
        score,
        reward_per_project: round4(score as f64 / policy.reward_divisor),
    }
}

/// Total blabz for a post matching `matched` projects, rounded to 4 places.
pub fn total_reward(quality: QualityScore, matched: usize) -> f64 {
    round4(quality.reward_per_project * matched as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(text_len: usize, likes: u64, reshares: u64, quote_shares: u64) -> CandidatePost {
        CandidatePost {
            id: "p1".to_string(),
            author_x_id: "u1".to_string(),
            text: "a".repeat(text_len),
            created_at: Utc::now(),
            likes,
            reshares,
            quote_shares,
            replies: 0,
            reference: None,
        }
    }

    #[test]
    fn alice_scenario_scores_30() {
        // 80 chars, 10 likes, 5 reshares, 2 quote-shares, 1000 followers:
        // length 0.15, engagement 26/1000, combined 0.294, score 30.
        let q = score_post(&post(80, 10, 5, 2), 1_000, &PipelinePolicy::default());
        assert_eq!(q.score, 30);
        assert_eq!(q.reward_per_project, 0.1);
    }

    #[test]
    fn zero_everything_scores_floor() {
        // Empty post, no engagement: combined = 0.25, score = round(24.75)+1 = 26.
        let q = score_post(&post(0, 0, 0, 0), 0, &PipelinePolicy::default());
        assert_eq!(q.score, 26);
    }

    #[test]
    fn score_stays_within_bounds_at_extremes() {
        let policy = PipelinePolicy::default();
        let max = score_post(&post(10_000, u64::MAX / 4, 0, 0), 1, &policy);
        assert!(max.score >= 1 && max.score <= 100, "got {}", max.score);
        let min = score_post(&post(0, 0, 0, 0), u64::MAX, &policy);
        assert!(min.score >= 1 && min.score <= 100, "got {}", min.score);
    }

    #[test]
    fn retuned_weights_cannot_breach_score_bounds() {
        let heavy = PipelinePolicy {
            base_weight: 2.0,
            length_weight: 1.0,
            engagement_weight: 1.0,
            ..PipelinePolicy::default()
        };
        let q = score_post(&post(500, 100, 0, 0), 10, &heavy);
        assert_eq!(q.score, 100);

        let negative = PipelinePolicy {
            base_weight: -1.0,
            ..PipelinePolicy::default()
        };
        let q = score_post(&post(0, 0, 0, 0), 1, &negative);
        assert_eq!(q.score, 1);
    }

    #[test]
    fn engagement_clamps_at_follower_count() {
        // 500 likes on 10 followers clamps engagement_score to 1.0.
        let q = score_post(&post(51, 500, 0, 0), 10, &PipelinePolicy::default());
        // combined = 0.25 + 0.25*(1/200) + 0.25*1.0 = 0.50125 → round(49.62)+1 = 51
        assert_eq!(q.score, 51);
    }

    #[test]
    fn reward_is_score_over_divisor_to_4dp() {
        let q = score_post(&post(80, 10, 5, 2), 1_000, &PipelinePolicy::default());
        assert_eq!(q.reward_per_project, round4(q.score as f64 / 300.0));
    }

    #[test]
    fn total_reward_scales_with_match_count() {
        let q = QualityScore {
            score: 30,
            reward_per_project: 0.1,
        };
        assert_eq!(total_reward(q, 2), 0.2);
        assert_eq!(total_reward(q, 1), 0.1);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let p = post(120, 7, 3, 1);
        let policy = PipelinePolicy::default();
        assert_eq!(score_post(&p, 250, &policy), score_post(&p, 250, &policy));
    }
}
