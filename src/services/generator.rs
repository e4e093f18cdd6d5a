use crate::config::GeneratorConfig;
use crate::models::{ContentRecommendation, GeneratorStats, RecommendationReason};
use crate::services::strategies::{
    CategoryPreferenceStrategy, PopularContentStrategy, RecommendStrategy, ScoredCandidate,
    SimilarUsersStrategy, StrategyContext, TagPreferenceStrategy, TrendingTopicStrategy,
};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Combines the five candidate strategies into one deduplicated, capped,
/// score-ordered recommendation list.
pub struct RecommendationGenerator {
    strategies: Vec<Box<dyn RecommendStrategy>>,
    config: GeneratorConfig,
}

impl RecommendationGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let strategies: Vec<Box<dyn RecommendStrategy>> = vec![
            Box::new(CategoryPreferenceStrategy),
            Box::new(TagPreferenceStrategy),
            Box::new(PopularContentStrategy),
            Box::new(TrendingTopicStrategy),
            Box::new(SimilarUsersStrategy),
        ];
        Self { strategies, config }
    }

    /// Generate the user's recommendation list against one consistent
    /// context snapshot. Deterministic for fixed inputs.
    pub fn generate(
        &self,
        ctx: &StrategyContext<'_>,
    ) -> (Vec<ContentRecommendation>, GeneratorStats) {
        let mut all_candidates = Vec::new();
        let mut stats = GeneratorStats::default();

        for strategy in &self.strategies {
            let candidates = strategy.propose(ctx);
            match strategy.reason() {
                RecommendationReason::CategoryPreference => {
                    stats.category_count = candidates.len()
                }
                RecommendationReason::TagPreference => stats.tag_count = candidates.len(),
                RecommendationReason::PopularContent => stats.popular_count = candidates.len(),
                RecommendationReason::TrendingTopic => stats.trending_count = candidates.len(),
                RecommendationReason::SimilarUsers => stats.similar_count = candidates.len(),
            }
            all_candidates.extend(candidates);
        }
        stats.total_candidates = all_candidates.len();

        let mut deduplicated = deduplicate_keep_highest(all_candidates);

        // Stable sort: equal scores keep first-encounter order, which is
        // itself deterministic (strategy order, then each strategy's own
        // deterministic ordering).
        deduplicated.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        deduplicated.truncate(self.config.max_recommendations);

        stats.final_count = deduplicated.len();

        info!(
            user_id = %ctx.user_id,
            category = stats.category_count,
            tag = stats.tag_count,
            popular = stats.popular_count,
            trending = stats.trending_count,
            similar = stats.similar_count,
            total = stats.total_candidates,
            final_count = stats.final_count,
            "Recommendations generated"
        );

        let recommendations = deduplicated
            .into_iter()
            .map(|c| ContentRecommendation {
                user_id: ctx.user_id,
                content_id: c.content_id,
                content_type: c.content_type,
                score: c.score,
                reason: c.reason,
                interacted: false,
                viewed: false,
            })
            .collect();

        (recommendations, stats)
    }
}

/// Group by content id and keep the single highest-scoring entry per id.
/// Ties keep the first-encountered candidate, and the kept entries stay in
/// encounter order, so the reduction is deterministic.
fn deduplicate_keep_highest(candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    let mut kept: Vec<ScoredCandidate> = Vec::new();
    let mut index_by_id: HashMap<Uuid, usize> = HashMap::new();

    for candidate in candidates {
        match index_by_id.get(&candidate.content_id) {
            Some(&idx) => {
                if candidate.score > kept[idx].score {
                    kept[idx] = candidate;
                }
            }
            None => {
                index_by_id.insert(candidate.content_id, kept.len());
                kept.push(candidate);
            }
        }
    }

    kept
}
