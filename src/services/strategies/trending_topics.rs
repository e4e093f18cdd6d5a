use super::{sort_by_engagement, RecommendStrategy, ScoredCandidate, StrategyContext};
use crate::models::{ContentRecord, RecommendationReason, TopicKey};

/// Trending Topic Strategy
///
/// Resolves the top trending topics back to content: items in the topic's
/// category, or carrying the topic's tag, with a couple of items per topic.
/// Candidates inherit the topic's trending score rather than their own
/// engagement.
pub struct TrendingTopicStrategy;

impl RecommendStrategy for TrendingTopicStrategy {
    fn reason(&self) -> RecommendationReason {
        RecommendationReason::TrendingTopic
    }

    fn propose(&self, ctx: &StrategyContext<'_>) -> Vec<ScoredCandidate> {
        let mut candidates = Vec::new();

        for topic in ctx.trending.iter().take(ctx.config.trending_topic_limit) {
            let mut matching: Vec<&ContentRecord> = ctx
                .eligible()
                .filter(|c| match &topic.key {
                    TopicKey::Category(category) => &c.category == category,
                    TopicKey::Tag(tag) => c.tags.iter().any(|t| t == tag),
                })
                .collect();
            sort_by_engagement(&mut matching);

            for content in matching.into_iter().take(ctx.config.per_topic_limit) {
                candidates.push(ScoredCandidate {
                    content_id: content.id,
                    content_type: content.content_type,
                    score: topic.trending_score * ctx.config.trending_factor,
                    reason: self.reason(),
                });
            }
        }

        candidates
    }
}
