use super::{RecommendStrategy, ScoredCandidate, StrategyContext};
use crate::models::RecommendationReason;

/// Similar Users Strategy
///
/// Collaborative stream: for each similar user, propose their most recent
/// upvotes. The score derives from the interaction weight, not the
/// content's engagement, so a fresh upvote from a close neighbour still
/// surfaces low-engagement content.
pub struct SimilarUsersStrategy;

impl RecommendStrategy for SimilarUsersStrategy {
    fn reason(&self) -> RecommendationReason {
        RecommendationReason::SimilarUsers
    }

    fn propose(&self, ctx: &StrategyContext<'_>) -> Vec<ScoredCandidate> {
        let mut candidates = Vec::new();

        for (similar_user, _similarity) in ctx.similar_users {
            for upvote in ctx
                .log
                .recent_upvotes(*similar_user, ctx.config.upvotes_per_similar_user)
            {
                if ctx.interacted.contains(&upvote.content_id) {
                    continue;
                }
                candidates.push(ScoredCandidate {
                    content_id: upvote.content_id,
                    content_type: upvote.content_type,
                    score: upvote.weight * ctx.config.similar_user_factor,
                    reason: self.reason(),
                });
            }
        }

        candidates
    }
}
