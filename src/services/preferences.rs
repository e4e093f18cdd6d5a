use crate::models::{ContentRecord, ContentType, Interaction, UserPreferences};
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// Floor for content-type weights after downward nudges.
const MIN_TYPE_WEIGHT: f64 = 0.1;
/// Per-interaction nudge applied to the content-type weight.
const TYPE_WEIGHT_STEP: f64 = 0.1;

/// Owns per-user taste profiles, keyed by user id.
///
/// Profiles are created lazily on first interaction and persist for the
/// process lifetime; an explicit [`reset`](PreferenceStore::reset) is the
/// only way a profile shrinks.
#[derive(Default)]
pub struct PreferenceStore {
    profiles: DashMap<Uuid, UserPreferences>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one interaction to the user's profile.
    ///
    /// Positive interactions (upvote/comment) against a visible record grow
    /// the category/tag/source sets; every interaction nudges the
    /// content-type weight. Deterministic and idempotent for a fixed
    /// interaction sequence and content snapshot.
    pub fn update(&self, interaction: &Interaction, content: Option<&ContentRecord>) {
        let mut prefs = self
            .profiles
            .entry(interaction.user_id)
            .or_insert_with(|| UserPreferences::new(interaction.user_id));

        if interaction.interaction_type.is_positive() {
            if let Some(record) = content.filter(|r| r.visible) {
                push_unique(&mut prefs.preferred_categories, &record.category);
                for tag in &record.tags {
                    push_unique(&mut prefs.preferred_tags, tag);
                }
                if record.content_type == ContentType::Review {
                    if let Some(source) = &record.source {
                        push_unique(&mut prefs.preferred_sources, source);
                    }
                }
            }
        }

        let entry = prefs
            .content_type_weights
            .entry(interaction.content_type)
            .or_insert(1.0);
        if interaction.weight > 0.0 {
            *entry += TYPE_WEIGHT_STEP;
        } else {
            *entry = (*entry - TYPE_WEIGHT_STEP).max(MIN_TYPE_WEIGHT);
        }

        prefs.last_updated = Utc::now();

        debug!(
            user_id = %interaction.user_id,
            categories = prefs.preferred_categories.len(),
            tags = prefs.preferred_tags.len(),
            "Preferences updated"
        );
    }

    /// Current profile for the user, if one exists.
    pub fn get(&self, user_id: Uuid) -> Option<UserPreferences> {
        self.profiles.get(&user_id).map(|p| p.clone())
    }

    /// Profile for the user, or a fresh empty one. Does not insert.
    pub fn get_or_default(&self, user_id: Uuid) -> UserPreferences {
        self.get(user_id)
            .unwrap_or_else(|| UserPreferences::new(user_id))
    }

    /// Drop the user's profile. The only shrink path for preference sets.
    pub fn reset(&self, user_id: Uuid) -> bool {
        self.profiles.remove(&user_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Insertion-ordered set semantics over a Vec.
fn push_unique(set: &mut Vec<String>, value: &str) {
    if !set.iter().any(|v| v == value) {
        set.push(value.to_string());
    }
}
