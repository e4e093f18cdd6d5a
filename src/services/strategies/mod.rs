mod category;
mod popular;
mod similar_users;
mod tags;
mod trending_topics;

use crate::config::GeneratorConfig;
use crate::models::{
    ContentRecord, ContentType, PopularEntry, RecommendationReason, TrendingTopic,
    UserPreferences,
};
use crate::services::interaction_log::LogSnapshot;
use std::collections::HashSet;
use uuid::Uuid;

pub use category::CategoryPreferenceStrategy;
pub use popular::PopularContentStrategy;
pub use similar_users::SimilarUsersStrategy;
pub use tags::TagPreferenceStrategy;
pub use trending_topics::TrendingTopicStrategy;

/// Everything one generation run reads: a single consistent snapshot of the
/// user's preferences, the corpus, the shared cycle caches, and the log.
/// All five strategies score against the same context, so no strategy ever
/// observes partially updated state.
pub struct StrategyContext<'a> {
    pub user_id: Uuid,
    pub prefs: &'a UserPreferences,
    pub corpus: &'a [ContentRecord],
    /// Content ids the user has already interacted with; never recommended.
    pub interacted: &'a HashSet<Uuid>,
    pub trending: &'a [TrendingTopic],
    pub popular: &'a [PopularEntry],
    /// Similar users, similarity-descending, already capped by the caller.
    pub similar_users: &'a [(Uuid, f64)],
    pub log: &'a LogSnapshot,
    pub config: &'a GeneratorConfig,
}

impl StrategyContext<'_> {
    /// Visible corpus items the user has not interacted with.
    pub fn eligible(&self) -> impl Iterator<Item = &ContentRecord> {
        self.corpus
            .iter()
            .filter(|c| c.visible && !self.interacted.contains(&c.id))
    }
}

/// A candidate proposed by one strategy, before dedup and capping.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub content_id: Uuid,
    pub content_type: ContentType,
    pub score: f64,
    pub reason: RecommendationReason,
}

/// One independently scored candidate stream.
pub trait RecommendStrategy: Send + Sync {
    fn reason(&self) -> RecommendationReason;
    /// Propose scored candidates for the context's user. Pure: no I/O, no
    /// shared-state mutation.
    fn propose(&self, ctx: &StrategyContext<'_>) -> Vec<ScoredCandidate>;
}

/// Deterministic engagement ordering: score descending, id ascending.
pub(crate) fn sort_by_engagement(items: &mut [&ContentRecord]) {
    items.sort_by(|a, b| {
        b.engagement_score
            .partial_cmp(&a.engagement_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}
