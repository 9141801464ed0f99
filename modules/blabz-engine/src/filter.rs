//! Content filter chain — the cheap per-post exclusion stages.
//!
//! Pure functions deciding whether a candidate is worth matching and
//! scoring. The ledger-backed already-evaluated check and the no-match
//! exclusion live in the pipeline driver because they need store access;
//! the verdict/reason vocabulary for all five stages is defined here.

use blabz_common::{mention_density, CandidatePost, PipelinePolicy};

/// Result of evaluating a candidate against one or more filter stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Candidate survives; keep evaluating.
    Continue,
    /// Candidate is out. The first matching stage wins.
    Excluded(ExclusionReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Reply or other disallowed reference kind (quotes are fine).
    UnsupportedReference,
    /// Text shorter than the minimum length.
    TooShort,
    /// Too much of the text is @mention tokens.
    MentionHeavy,
    /// A ledger entry already exists for this id.
    AlreadyEvaluated,
    /// Survived the content stages but matched no configured project.
    NoProjectMatch,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::UnsupportedReference => write!(f, "unsupported_reference"),
            ExclusionReason::TooShort => write!(f, "too_short"),
            ExclusionReason::MentionHeavy => write!(f, "mention_heavy"),
            ExclusionReason::AlreadyEvaluated => write!(f, "already_evaluated"),
            ExclusionReason::NoProjectMatch => write!(f, "no_project_match"),
        }
    }
}

/// Content stages, applied in fixed order, first exclusion wins:
///
/// 1. Reference kind not in the allow-list (original + quoted) → Excluded
/// 2. Text length below `min_text_len` → Excluded
/// 3. Mention density above `mention_density_max` (exclusive) → Excluded
///
/// Stage 4 (already evaluated) and stage 5 (no project match) run in the
/// pipeline driver after this returns `Continue`.
pub fn content_verdict(post: &CandidatePost, policy: &PipelinePolicy) -> Verdict {
    if !policy.reference_allowed(post.reference) {
        return Verdict::Excluded(ExclusionReason::UnsupportedReference);
    }

    if post.text.chars().count() < policy.min_text_len {
        return Verdict::Excluded(ExclusionReason::TooShort);
    }

    if mention_density(&post.text) > policy.mention_density_max {
        return Verdict::Excluded(ExclusionReason::MentionHeavy);
    }

    Verdict::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use blabz_common::ReferenceKind;
    use chrono::Utc;

    fn candidate(text: &str, reference: Option<ReferenceKind>) -> CandidatePost {
        CandidatePost {
            id: "p1".to_string(),
            author_x_id: "u1".to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
            likes: 0,
            reshares: 0,
            quote_shares: 0,
            replies: 0,
            reference,
        }
    }

    #[test]
    fn reply_is_excluded_regardless_of_length() {
        let long_text = "a".repeat(200);
        let v = content_verdict(
            &candidate(&long_text, Some(ReferenceKind::RepliedTo)),
            &PipelinePolicy::default(),
        );
        assert_eq!(v, Verdict::Excluded(ExclusionReason::UnsupportedReference));
    }

    #[test]
    fn quote_post_passes_reference_stage() {
        let text = "a".repeat(60);
        let v = content_verdict(
            &candidate(&text, Some(ReferenceKind::Quoted)),
            &PipelinePolicy::default(),
        );
        assert_eq!(v, Verdict::Continue);
    }

    #[test]
    fn length_50_excluded_length_51_retained() {
        let policy = PipelinePolicy::default();
        let at_50 = candidate(&"a".repeat(50), None);
        let at_51 = candidate(&"a".repeat(51), None);
        assert_eq!(
            content_verdict(&at_50, &policy),
            Verdict::Excluded(ExclusionReason::TooShort)
        );
        assert_eq!(content_verdict(&at_51, &policy), Verdict::Continue);
    }

    #[test]
    fn mention_heavy_text_is_excluded() {
        // 49 of 56 chars are mention tokens — density ~0.87.
        let text = format!("{} {} gm gm", "@averylonghandle".repeat(2), "@anotherbighandle");
        assert!(text.chars().count() >= 51);
        let v = content_verdict(&candidate(&text, None), &PipelinePolicy::default());
        assert_eq!(v, Verdict::Excluded(ExclusionReason::MentionHeavy));
    }

    #[test]
    fn density_at_threshold_is_retained() {
        // Exactly 0.6 must pass: the threshold is exclusive.
        // 60 mention chars, 100 total chars.
        let mentions = "@abcdefghi ".repeat(6); // 6 tokens of 10 chars + 6 spaces = 66
        let text = format!("{}{}", mentions, "y".repeat(34)); // 60 mention chars / 100 total
        assert_eq!(text.chars().count(), 100);
        let v = content_verdict(&candidate(&text, None), &PipelinePolicy::default());
        assert_eq!(v, Verdict::Continue);
    }

    #[test]
    fn reference_stage_runs_before_length() {
        // Short AND a reply: the reference stage wins because it runs first.
        let v = content_verdict(
            &candidate("short", Some(ReferenceKind::RepliedTo)),
            &PipelinePolicy::default(),
        );
        assert_eq!(v, Verdict::Excluded(ExclusionReason::UnsupportedReference));
    }
}
