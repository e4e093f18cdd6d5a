use super::{sort_by_engagement, RecommendStrategy, ScoredCandidate, StrategyContext};
use crate::models::{ContentRecord, RecommendationReason};

/// Category Preference Strategy
///
/// For each of the user's preferred categories (insertion order), take the
/// top visible items by engagement and boost them for the category match
/// and the user's content-type weight.
pub struct CategoryPreferenceStrategy;

impl RecommendStrategy for CategoryPreferenceStrategy {
    fn reason(&self) -> RecommendationReason {
        RecommendationReason::CategoryPreference
    }

    fn propose(&self, ctx: &StrategyContext<'_>) -> Vec<ScoredCandidate> {
        let mut candidates = Vec::new();

        for category in &ctx.prefs.preferred_categories {
            let mut matching: Vec<&ContentRecord> =
                ctx.eligible().filter(|c| &c.category == category).collect();
            sort_by_engagement(&mut matching);

            for content in matching.into_iter().take(ctx.config.per_category_limit) {
                candidates.push(ScoredCandidate {
                    content_id: content.id,
                    content_type: content.content_type,
                    score: content.engagement_score
                        * ctx.config.preferred_category_boost
                        * ctx.prefs.type_weight(content.content_type),
                    reason: self.reason(),
                });
            }
        }

        candidates
    }
}
