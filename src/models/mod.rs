use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Content types served by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Post,
    Review,
    Comment,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Post => "post",
            ContentType::Review => "review",
            ContentType::Comment => "comment",
        }
    }
}

/// User interaction kinds, each with a fixed engagement weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    View,
    Upvote,
    Comment,
    Share,
    Save,
}

impl InteractionType {
    /// Fixed weight used for preference nudges and similar-user scoring.
    /// Views are a weak signal; upvotes and comments are the strongest.
    pub fn weight(&self) -> f64 {
        match self {
            InteractionType::View => 0.5,
            InteractionType::Upvote => 2.0,
            InteractionType::Comment => 2.5,
            InteractionType::Share => 1.5,
            InteractionType::Save => 1.0,
        }
    }

    /// Positive interactions grow the user's preference sets.
    pub fn is_positive(&self) -> bool {
        matches!(self, InteractionType::Upvote | InteractionType::Comment)
    }
}

/// A single append-only log entry. Never mutated after recording; all
/// derived state is recomputable from the log plus a corpus snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub content_type: ContentType,
    pub interaction_type: InteractionType,
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
}

/// Per-user accumulated taste profile.
///
/// The three preference sets are insertion-ordered and grow-only: they gain
/// entries on positive interactions with new categories/tags/sources and
/// shrink only via an explicit reset. Content-type weights start at 1.0 and
/// are nudged ±0.1 per interaction, clamped to a floor of 0.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: Uuid,
    pub preferred_categories: Vec<String>,
    pub preferred_tags: Vec<String>,
    pub preferred_sources: Vec<String>,
    pub content_type_weights: HashMap<ContentType, f64>,
    pub last_updated: DateTime<Utc>,
}

impl UserPreferences {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            preferred_categories: Vec::new(),
            preferred_tags: Vec::new(),
            preferred_sources: Vec::new(),
            content_type_weights: HashMap::new(),
            last_updated: Utc::now(),
        }
    }

    /// Weight multiplier for a content type (1.0 until adjusted).
    pub fn type_weight(&self, content_type: ContentType) -> f64 {
        self.content_type_weights
            .get(&content_type)
            .copied()
            .unwrap_or(1.0)
    }
}

/// What a trending topic resolves back to: exactly one of a category or a
/// tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKey {
    Category(String),
    Tag(String),
}

/// A time-windowed trending aggregate for one category or qualifying tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub label: String,
    pub key: TopicKey,
    pub content_count: u32,
    pub engagement_score: f64,
    pub trending_score: f64,
}

/// Windowed per-category aggregate, including growth against the preceding
/// window of the same length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    /// Items in this category created within the trending window.
    pub post_count: u32,
    /// Engagement summed over the same recent items.
    pub total_engagement: f64,
    /// Ids of the recent items, engagement-descending.
    pub recent_posts: Vec<Uuid>,
    /// Percentage growth of the recent window vs the window before it.
    pub growth_rate: f64,
}

/// The strategy that proposed a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    CategoryPreference,
    TagPreference,
    PopularContent,
    TrendingTopic,
    SimilarUsers,
}

impl RecommendationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationReason::CategoryPreference => "category_preference",
            RecommendationReason::TagPreference => "tag_preference",
            RecommendationReason::PopularContent => "popular_content",
            RecommendationReason::TrendingTopic => "trending_topic",
            RecommendationReason::SimilarUsers => "similar_users",
        }
    }
}

/// One entry in a user's recommendation list. Within a user's list the
/// content id is unique and entries are score-descending, capped at the
/// configured maximum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecommendation {
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub content_type: ContentType,
    pub score: f64,
    pub reason: RecommendationReason,
    /// Set once the user acts on the recommendation.
    pub interacted: bool,
    pub viewed: bool,
}

/// Read-only corpus record. Owned by the content collaborator; the engine
/// never mutates these. `engagement_score` is computed externally (upvotes,
/// downvotes, comment count) and treated as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: Uuid,
    pub content_type: ContentType,
    pub category: String,
    pub tags: Vec<String>,
    /// Review subject/app; present for reviews only.
    pub source: Option<String>,
    pub engagement_score: f64,
    pub created_at: DateTime<Utc>,
    pub visible: bool,
}

/// One entry in the global popularity ranking cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularEntry {
    pub content_id: Uuid,
    pub content_type: ContentType,
    pub engagement_score: f64,
}

/// Per-strategy candidate counts for one generation run.
#[derive(Debug, Clone, Default)]
pub struct GeneratorStats {
    pub category_count: usize,
    pub tag_count: usize,
    pub popular_count: usize,
    pub trending_count: usize,
    pub similar_count: usize,
    pub total_candidates: usize,
    pub final_count: usize,
}

/// Bookkeeping for one full batch cycle.
#[derive(Debug, Clone, Default)]
pub struct BatchCycleStats {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub trending_topics: usize,
    pub popular_items: usize,
    pub users_processed: usize,
    pub users_succeeded: usize,
    pub users_failed: usize,
    pub duration_ms: u64,
}
