use super::{RecommendStrategy, ScoredCandidate, StrategyContext};
use crate::models::RecommendationReason;

/// Popular Content Strategy
///
/// Proposes the head of the global popularity ranking (already
/// engagement-descending with deterministic tie-breaks), minus anything the
/// user has interacted with.
pub struct PopularContentStrategy;

impl RecommendStrategy for PopularContentStrategy {
    fn reason(&self) -> RecommendationReason {
        RecommendationReason::PopularContent
    }

    fn propose(&self, ctx: &StrategyContext<'_>) -> Vec<ScoredCandidate> {
        ctx.popular
            .iter()
            .take(ctx.config.popular_limit)
            .filter(|entry| !ctx.interacted.contains(&entry.content_id))
            .map(|entry| ScoredCandidate {
                content_id: entry.content_id,
                content_type: entry.content_type,
                score: entry.engagement_score * ctx.config.popular_boost,
                reason: self.reason(),
            })
            .collect()
    }
}
