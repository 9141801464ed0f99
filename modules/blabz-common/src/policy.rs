use chrono::{DateTime, Duration, Utc};

use crate::types::ReferenceKind;

/// Tunable pipeline policy. The defaults are the observed production values;
/// none of them are load-bearing invariants, so they live here as fields
/// rather than hard-coded constants in the stages that use them.
#[derive(Debug, Clone)]
pub struct PipelinePolicy {
    /// Posts shorter than this many characters are excluded (length 50 is
    /// out, 51 is in).
    pub min_text_len: usize,
    /// Exclusive ceiling on the fraction of text consumed by @mention tokens.
    pub mention_density_max: f64,
    /// Constant term of the combined score, applied regardless of inputs.
    pub base_weight: f64,
    pub length_weight: f64,
    pub engagement_weight: f64,
    /// Blabz per project = score / this.
    pub reward_divisor: f64,
    /// Trailing fetch/categorization window.
    pub lookback_days: i64,
    /// Upstream page size cap per fetch.
    pub page_size: u32,
    /// Guard cooldown after an upstream rate-limit signal.
    pub cooldown_minutes: i64,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            min_text_len: 51,
            mention_density_max: 0.6,
            base_weight: 0.25,
            length_weight: 0.25,
            engagement_weight: 0.25,
            reward_divisor: 300.0,
            lookback_days: 7,
            page_size: 50,
            cooldown_minutes: 15,
        }
    }
}

impl PipelinePolicy {
    /// Start of the lookback window relative to `now`.
    pub fn lookback_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.lookback_days)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::minutes(self.cooldown_minutes)
    }

    /// Reference-kind allow-list: original posts and quote-posts score;
    /// replies and everything else are excluded.
    pub fn reference_allowed(&self, reference: Option<ReferenceKind>) -> bool {
        matches!(reference, None | Some(ReferenceKind::Quoted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_values() {
        let p = PipelinePolicy::default();
        assert_eq!(p.min_text_len, 51);
        assert_eq!(p.mention_density_max, 0.6);
        assert_eq!(p.reward_divisor, 300.0);
        assert_eq!(p.page_size, 50);
    }

    #[test]
    fn quotes_allowed_replies_excluded() {
        let p = PipelinePolicy::default();
        assert!(p.reference_allowed(None));
        assert!(p.reference_allowed(Some(ReferenceKind::Quoted)));
        assert!(!p.reference_allowed(Some(ReferenceKind::RepliedTo)));
        assert!(!p.reference_allowed(Some(ReferenceKind::Retweeted)));
        assert!(!p.reference_allowed(Some(ReferenceKind::Other)));
    }
}
