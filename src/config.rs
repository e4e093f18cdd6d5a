use serde::Deserialize;
use std::env;

/// Engine-wide configuration, one sub-config per component.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    pub trending: TrendingConfig,
    pub popularity: PopularityConfig,
    pub similarity: SimilarityConfig,
    pub generator: GeneratorConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingConfig {
    /// Rolling window for trending aggregates, in hours.
    pub window_hours: i64,
    /// Tags below this recent count never become trending topics.
    pub min_tag_count: u32,
    /// trending_score = count * count_weight + engagement * engagement_weight
    pub count_weight: f64,
    pub engagement_weight: f64,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            min_tag_count: 3,
            count_weight: 0.3,
            engagement_weight: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PopularityConfig {
    /// Minimum engagement score for the global popularity ranking.
    pub engagement_threshold: f64,
}

impl Default for PopularityConfig {
    fn default() -> Self {
        Self {
            engagement_threshold: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarityConfig {
    /// Users at or below this Jaccard similarity are not considered similar.
    pub min_similarity: f64,
    /// Similar-user candidate pool cap.
    pub max_similar_users: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.1,
            max_similar_users: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Hard cap on a user's recommendation list.
    pub max_recommendations: usize,
    /// Candidates per preferred category.
    pub per_category_limit: usize,
    /// Candidates per preferred tag, separately for posts and reviews.
    pub per_tag_limit: usize,
    /// Candidates taken from the top of the popularity ranking.
    pub popular_limit: usize,
    /// Trending topics considered.
    pub trending_topic_limit: usize,
    /// Candidates per trending topic.
    pub per_topic_limit: usize,
    /// Recent upvotes sampled per similar user.
    pub upvotes_per_similar_user: usize,

    // Score multipliers
    pub preferred_category_boost: f64,
    pub tag_match_step: f64,
    pub preferred_source_boost: f64,
    pub popular_boost: f64,
    pub trending_factor: f64,
    pub similar_user_factor: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_recommendations: 50,
            per_category_limit: 5,
            per_tag_limit: 3,
            popular_limit: 10,
            trending_topic_limit: 5,
            per_topic_limit: 2,
            upvotes_per_similar_user: 5,
            preferred_category_boost: 2.0,
            tag_match_step: 0.5,
            preferred_source_boost: 1.5,
            popular_boost: 1.2,
            trending_factor: 0.8,
            similar_user_factor: 0.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Corpus-change triggers are debounced by this interval.
    pub debounce_ms: u64,
    /// Per-user regenerations run with at most this much parallelism in
    /// phase two of a batch cycle.
    pub regeneration_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            regeneration_concurrency: 8,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults above for anything unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            trending: TrendingConfig {
                window_hours: env_parse("TRENDING_WINDOW_HOURS", defaults.trending.window_hours),
                min_tag_count: env_parse("TRENDING_MIN_TAG_COUNT", defaults.trending.min_tag_count),
                count_weight: env_parse("TRENDING_COUNT_WEIGHT", defaults.trending.count_weight),
                engagement_weight: env_parse(
                    "TRENDING_ENGAGEMENT_WEIGHT",
                    defaults.trending.engagement_weight,
                ),
            },
            popularity: PopularityConfig {
                engagement_threshold: env_parse(
                    "POPULARITY_ENGAGEMENT_THRESHOLD",
                    defaults.popularity.engagement_threshold,
                ),
            },
            similarity: SimilarityConfig {
                min_similarity: env_parse("SIMILARITY_MIN", defaults.similarity.min_similarity),
                max_similar_users: env_parse(
                    "SIMILARITY_MAX_USERS",
                    defaults.similarity.max_similar_users,
                ),
            },
            generator: GeneratorConfig {
                max_recommendations: env_parse(
                    "GENERATOR_MAX_RECOMMENDATIONS",
                    defaults.generator.max_recommendations,
                ),
                per_category_limit: env_parse(
                    "GENERATOR_PER_CATEGORY_LIMIT",
                    defaults.generator.per_category_limit,
                ),
                per_tag_limit: env_parse(
                    "GENERATOR_PER_TAG_LIMIT",
                    defaults.generator.per_tag_limit,
                ),
                popular_limit: env_parse("GENERATOR_POPULAR_LIMIT", defaults.generator.popular_limit),
                trending_topic_limit: env_parse(
                    "GENERATOR_TRENDING_TOPIC_LIMIT",
                    defaults.generator.trending_topic_limit,
                ),
                per_topic_limit: env_parse(
                    "GENERATOR_PER_TOPIC_LIMIT",
                    defaults.generator.per_topic_limit,
                ),
                upvotes_per_similar_user: env_parse(
                    "GENERATOR_UPVOTES_PER_SIMILAR_USER",
                    defaults.generator.upvotes_per_similar_user,
                ),
                ..defaults.generator
            },
            batch: BatchConfig {
                debounce_ms: env_parse("BATCH_DEBOUNCE_MS", defaults.batch.debounce_ms),
                regeneration_concurrency: env_parse(
                    "BATCH_REGENERATION_CONCURRENCY",
                    defaults.batch.regeneration_concurrency,
                ),
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
