use crate::config::PopularityConfig;
use crate::models::{ContentRecord, PopularEntry};
use tracing::debug;

/// Global engagement ranking over the full visible snapshot (not windowed).
pub struct PopularityRanker {
    config: PopularityConfig,
}

impl PopularityRanker {
    pub fn new(config: PopularityConfig) -> Self {
        Self { config }
    }

    /// Visible items at or above the engagement threshold, sorted
    /// engagement-descending with content-id ascending tie-break. The
    /// result is content-type-agnostic; callers filter by type post-hoc.
    pub fn calculate(&self, snapshot: &[ContentRecord]) -> Vec<PopularEntry> {
        let mut entries: Vec<PopularEntry> = snapshot
            .iter()
            .filter(|c| c.visible && c.engagement_score >= self.config.engagement_threshold)
            .map(|c| PopularEntry {
                content_id: c.id,
                content_type: c.content_type,
                engagement_score: c.engagement_score,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.engagement_score
                .partial_cmp(&a.engagement_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.content_id.cmp(&b.content_id))
        });

        debug!(entries = entries.len(), "Popularity ranking recomputed");
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use chrono::Utc;
    use uuid::Uuid;

    fn content(engagement: f64) -> ContentRecord {
        ContentRecord {
            id: Uuid::new_v4(),
            content_type: ContentType::Post,
            category: "advice".to_string(),
            tags: vec![],
            source: None,
            engagement_score: engagement,
            created_at: Utc::now(),
            visible: true,
        }
    }

    #[test]
    fn test_threshold_filter_and_order() {
        let ranker = PopularityRanker::new(PopularityConfig::default());
        let snapshot = vec![content(5.0), content(25.0), content(10.0), content(40.0)];

        let entries = ranker.calculate(&snapshot);
        let scores: Vec<f64> = entries.iter().map(|e| e.engagement_score).collect();
        // 5.0 is below the threshold of 10; 10.0 is inclusive.
        assert_eq!(scores, vec![40.0, 25.0, 10.0]);
    }

    #[test]
    fn test_tie_broken_by_id_ascending() {
        let ranker = PopularityRanker::new(PopularityConfig::default());
        let a = content(20.0);
        let b = content(20.0);
        let expected_first = a.id.min(b.id);

        let entries = ranker.calculate(&[a, b]);
        assert_eq!(entries[0].content_id, expected_first);
    }

    #[test]
    fn test_hidden_content_excluded() {
        let ranker = PopularityRanker::new(PopularityConfig::default());
        let mut hidden = content(99.0);
        hidden.visible = false;
        assert!(ranker.calculate(&[hidden]).is_empty());
    }
}
