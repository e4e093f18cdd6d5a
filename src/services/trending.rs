use crate::config::TrendingConfig;
use crate::models::{CategoryStats, ContentRecord, TopicKey, TrendingTopic};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Computes time-windowed trending topics and category aggregates from a
/// corpus snapshot.
///
/// Aggregation runs over `BTreeMap` so iteration order is lexicographic and
/// the output is reproducible; ties on trending score break by label.
pub struct TrendingCalculator {
    config: TrendingConfig,
}

#[derive(Default)]
struct Aggregate {
    count: u32,
    engagement: f64,
}

impl TrendingCalculator {
    pub fn new(config: TrendingConfig) -> Self {
        Self { config }
    }

    /// Trending topics over the configured window, score-descending.
    ///
    /// Every category with recent content becomes a topic; tags qualify
    /// only with a recent count at or above the noise threshold. An empty
    /// window yields an empty list.
    pub fn calculate(&self, snapshot: &[ContentRecord], now: DateTime<Utc>) -> Vec<TrendingTopic> {
        let cutoff = now - Duration::hours(self.config.window_hours);
        let recent: Vec<&ContentRecord> = snapshot
            .iter()
            .filter(|c| c.visible && c.created_at >= cutoff)
            .collect();

        if recent.is_empty() {
            return Vec::new();
        }

        let mut by_category: BTreeMap<String, Aggregate> = BTreeMap::new();
        let mut by_tag: BTreeMap<String, Aggregate> = BTreeMap::new();

        for content in &recent {
            let agg = by_category.entry(content.category.clone()).or_default();
            agg.count += 1;
            agg.engagement += content.engagement_score;

            for tag in &content.tags {
                let agg = by_tag.entry(tag.clone()).or_default();
                agg.count += 1;
                agg.engagement += content.engagement_score;
            }
        }

        let mut topics: Vec<TrendingTopic> = Vec::new();

        for (category, agg) in &by_category {
            topics.push(self.topic(category, TopicKey::Category(category.clone()), agg));
        }
        for (tag, agg) in &by_tag {
            if agg.count >= self.config.min_tag_count {
                topics.push(self.topic(tag, TopicKey::Tag(tag.clone()), agg));
            }
        }

        topics.sort_by(|a, b| {
            b.trending_score
                .partial_cmp(&a.trending_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        });

        debug!(
            recent_items = recent.len(),
            topics = topics.len(),
            "Trending recomputed"
        );

        topics
    }

    /// Per-category windowed stats, including growth against the preceding
    /// window of the same length. Sorted by category for determinism.
    pub fn category_stats(
        &self,
        snapshot: &[ContentRecord],
        now: DateTime<Utc>,
    ) -> Vec<CategoryStats> {
        let window = Duration::hours(self.config.window_hours);
        let cutoff = now - window;
        let previous_cutoff = cutoff - window;

        let mut recent: BTreeMap<String, Vec<&ContentRecord>> = BTreeMap::new();
        let mut previous_counts: BTreeMap<String, u32> = BTreeMap::new();

        for content in snapshot.iter().filter(|c| c.visible) {
            if content.created_at >= cutoff {
                recent.entry(content.category.clone()).or_default().push(content);
            } else if content.created_at >= previous_cutoff {
                *previous_counts.entry(content.category.clone()).or_default() += 1;
            }
        }

        recent
            .into_iter()
            .map(|(category, mut items)| {
                items.sort_by(|a, b| {
                    b.engagement_score
                        .partial_cmp(&a.engagement_score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.id.cmp(&b.id))
                });

                let previous = previous_counts.get(&category).copied().unwrap_or(0);
                let recent_count = items.len() as u32;
                let growth_rate = if previous > 0 {
                    (recent_count as f64 - previous as f64) / previous as f64 * 100.0
                } else if recent_count > 0 {
                    100.0
                } else {
                    0.0
                };

                CategoryStats {
                    total_engagement: items.iter().map(|c| c.engagement_score).sum(),
                    recent_posts: items.iter().map(|c| c.id).collect(),
                    post_count: recent_count,
                    growth_rate,
                    category,
                }
            })
            .collect()
    }

    fn topic(&self, label: &str, key: TopicKey, agg: &Aggregate) -> TrendingTopic {
        TrendingTopic {
            label: label.to_string(),
            key,
            content_count: agg.count,
            engagement_score: agg.engagement,
            trending_score: agg.count as f64 * self.config.count_weight
                + agg.engagement * self.config.engagement_weight,
        }
    }
}
