pub mod content_source;
pub mod engine;
pub mod generator;
pub mod interaction_log;
pub mod popularity;
pub mod preferences;
pub mod similarity;
pub mod strategies;
pub mod trending;

pub use content_source::{ContentSource, InMemoryContentSource};
pub use engine::RecommendationEngine;
pub use generator::RecommendationGenerator;
pub use interaction_log::{InteractionLog, LogSnapshot};
pub use popularity::PopularityRanker;
pub use preferences::PreferenceStore;
pub use similarity::SimilarityEngine;
pub use trending::TrendingCalculator;
