use crate::models::{Interaction, InteractionType};
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Append-only interaction log.
///
/// Entries are never mutated or deleted; all derived state (preferences,
/// similarity, recommendations) is recomputable from the log plus a corpus
/// snapshot. Readers take a [`LogSnapshot`] and compute against that —
/// interactions appended mid-computation surface on the next cycle.
#[derive(Default)]
pub struct InteractionLog {
    entries: RwLock<Vec<Interaction>>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, interaction: Interaction) {
        debug!(
            user_id = %interaction.user_id,
            content_id = %interaction.content_id,
            interaction_type = ?interaction.interaction_type,
            "Interaction recorded"
        );
        self.entries.write().await.push(interaction);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Point-in-time copy of the log for a recompute pass.
    pub async fn snapshot(&self) -> LogSnapshot {
        LogSnapshot {
            entries: self.entries.read().await.clone(),
        }
    }
}

/// Immutable view of the log at a point in time. All queries are pure.
#[derive(Debug, Clone, Default)]
pub struct LogSnapshot {
    entries: Vec<Interaction>,
}

impl LogSnapshot {
    pub fn from_entries(entries: Vec<Interaction>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Interaction] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Content ids the user has interacted with, any interaction type.
    pub fn user_content_ids(&self, user_id: Uuid) -> HashSet<Uuid> {
        self.entries
            .iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| i.content_id)
            .collect()
    }

    /// Every distinct user with at least one interaction, sorted by id for
    /// deterministic batch iteration.
    pub fn distinct_users(&self) -> Vec<Uuid> {
        let mut users: Vec<Uuid> = self
            .entries
            .iter()
            .map(|i| i.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        users.sort();
        users
    }

    /// The user's most recent upvotes, newest first. Equal timestamps
    /// resolve by append order (later entries first), which is
    /// deterministic for a fixed log.
    pub fn recent_upvotes(&self, user_id: Uuid, limit: usize) -> Vec<&Interaction> {
        let mut upvotes: Vec<(usize, &Interaction)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, i)| {
                i.user_id == user_id && i.interaction_type == InteractionType::Upvote
            })
            .collect();
        upvotes.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp).then(b.0.cmp(&a.0)));
        upvotes.into_iter().take(limit).map(|(_, i)| i).collect()
    }
}
