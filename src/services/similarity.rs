use crate::config::SimilarityConfig;
use crate::services::interaction_log::LogSnapshot;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;
use uuid::Uuid;

/// Collaborative-style user similarity over interacted-content-id sets.
///
/// O(U log U) per invocation for U distinct other users; sized for moderate
/// interaction logs, not web-scale fan-out.
pub struct SimilarityEngine {
    config: SimilarityConfig,
}

impl SimilarityEngine {
    pub fn new(config: SimilarityConfig) -> Self {
        Self { config }
    }

    /// Users whose Jaccard similarity with the target exceeds the
    /// threshold, similarity-descending with user-id ascending tie-break.
    pub fn find_similar(&self, user_id: Uuid, log: &LogSnapshot) -> Vec<(Uuid, f64)> {
        let target: HashSet<Uuid> = log.user_content_ids(user_id);
        if target.is_empty() {
            return Vec::new();
        }

        // BTreeMap keeps the candidate iteration order deterministic.
        let mut others: BTreeMap<Uuid, HashSet<Uuid>> = BTreeMap::new();
        for interaction in log.entries() {
            if interaction.user_id != user_id {
                others
                    .entry(interaction.user_id)
                    .or_default()
                    .insert(interaction.content_id);
            }
        }

        let mut similar: Vec<(Uuid, f64)> = others
            .into_iter()
            .filter_map(|(other, set)| {
                let similarity = jaccard(&target, &set);
                (similarity > self.config.min_similarity).then_some((other, similarity))
            })
            .collect();

        similar.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        debug!(
            user_id = %user_id,
            similar_users = similar.len(),
            "Similarity computed"
        );

        similar
    }
}

/// Jaccard similarity: |A ∩ B| / |A ∪ B|. Empty union yields 0.
pub fn jaccard(a: &HashSet<Uuid>, b: &HashSet<Uuid>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
