use super::{sort_by_engagement, RecommendStrategy, ScoredCandidate, StrategyContext};
use crate::models::{ContentRecord, ContentType, RecommendationReason};

/// Tag Preference Strategy
///
/// For each preferred tag, take the top posts and top reviews matching it.
/// The score scales with how many of the user's preferred tags the item
/// carries; reviews from a preferred source get an extra boost.
pub struct TagPreferenceStrategy;

impl TagPreferenceStrategy {
    fn score(&self, ctx: &StrategyContext<'_>, content: &ContentRecord) -> f64 {
        let matching_tags = content
            .tags
            .iter()
            .filter(|t| ctx.prefs.preferred_tags.contains(t))
            .count();

        let mut score = content.engagement_score
            * (1.0 + ctx.config.tag_match_step * matching_tags as f64)
            * ctx.prefs.type_weight(content.content_type);

        if content.content_type == ContentType::Review {
            if let Some(source) = &content.source {
                if ctx.prefs.preferred_sources.contains(source) {
                    score *= ctx.config.preferred_source_boost;
                }
            }
        }

        score
    }

    fn top_matching<'a>(
        &self,
        ctx: &'a StrategyContext<'_>,
        tag: &str,
        content_type: ContentType,
    ) -> Vec<&'a ContentRecord> {
        let mut matching: Vec<&ContentRecord> = ctx
            .eligible()
            .filter(|c| c.content_type == content_type && c.tags.iter().any(|t| t == tag))
            .collect();
        sort_by_engagement(&mut matching);
        matching.truncate(ctx.config.per_tag_limit);
        matching
    }
}

impl RecommendStrategy for TagPreferenceStrategy {
    fn reason(&self) -> RecommendationReason {
        RecommendationReason::TagPreference
    }

    fn propose(&self, ctx: &StrategyContext<'_>) -> Vec<ScoredCandidate> {
        let mut candidates = Vec::new();

        for tag in &ctx.prefs.preferred_tags {
            for content_type in [ContentType::Post, ContentType::Review] {
                for content in self.top_matching(ctx, tag, content_type) {
                    candidates.push(ScoredCandidate {
                        content_id: content.id,
                        content_type: content.content_type,
                        score: self.score(ctx, content),
                        reason: self.reason(),
                    });
                }
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{post, review, ContextFixture};
    use super::*;

    #[test]
    fn test_matching_tag_count_scales_score() {
        let mut fixture = ContextFixture::new();
        fixture.prefs.preferred_tags = vec!["ghosting".to_string(), "red-flag".to_string()];
        fixture.corpus = vec![post("advice", &["ghosting", "red-flag"], 10.0)];

        let candidates = TagPreferenceStrategy.propose(&fixture.context());
        // Proposed under both tags; both carry the two-tag score.
        assert_eq!(candidates.len(), 2);
        // engagement 10 * (1 + 0.5 * 2 matching tags)
        assert!((candidates[0].score - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_preferred_source_boost_for_reviews() {
        let mut fixture = ContextFixture::new();
        fixture.prefs.preferred_tags = vec!["ghosting".to_string()];
        fixture.prefs.preferred_sources = vec!["appA".to_string()];
        fixture.corpus = vec![
            review("advice", &["ghosting"], "appA", 10.0),
            review("advice", &["ghosting"], "appB", 10.0),
        ];

        let candidates = TagPreferenceStrategy.propose(&fixture.context());
        let preferred = candidates
            .iter()
            .find(|c| c.content_id == fixture.corpus[0].id)
            .unwrap();
        let other = candidates
            .iter()
            .find(|c| c.content_id == fixture.corpus[1].id)
            .unwrap();

        // engagement 10 * (1 + 0.5) = 15; preferred source adds * 1.5.
        assert!((other.score - 15.0).abs() < 1e-9);
        assert!((preferred.score - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_per_tag_limit_applies_per_content_type() {
        let mut fixture = ContextFixture::new();
        fixture.prefs.preferred_tags = vec!["ghosting".to_string()];
        for i in 0..5 {
            fixture.corpus.push(post("advice", &["ghosting"], i as f64));
            fixture
                .corpus
                .push(review("advice", &["ghosting"], "appA", i as f64));
        }

        let candidates = TagPreferenceStrategy.propose(&fixture.context());
        let posts = candidates
            .iter()
            .filter(|c| c.content_type == ContentType::Post)
            .count();
        let reviews = candidates
            .iter()
            .filter(|c| c.content_type == ContentType::Review)
            .count();
        assert_eq!(posts, fixture.config.per_tag_limit);
        assert_eq!(reviews, fixture.config.per_tag_limit);
    }

    #[test]
    fn test_no_preferred_tags_no_candidates() {
        let mut fixture = ContextFixture::new();
        fixture.corpus = vec![post("advice", &["ghosting"], 10.0)];
        assert!(TagPreferenceStrategy.propose(&fixture.context()).is_empty());
    }
}
