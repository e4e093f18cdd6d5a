use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::{
    BatchCycleStats, CategoryStats, ContentRecommendation, ContentRecord, ContentType,
    Interaction, InteractionType, PopularEntry, TrendingTopic, UserPreferences,
};
use crate::services::content_source::ContentSource;
use crate::services::generator::RecommendationGenerator;
use crate::services::interaction_log::{InteractionLog, LogSnapshot};
use crate::services::popularity::PopularityRanker;
use crate::services::preferences::PreferenceStore;
use crate::services::similarity::SimilarityEngine;
use crate::services::strategies::StrategyContext;
use crate::services::trending::TrendingCalculator;
use chrono::Utc;
use dashmap::DashMap;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Content recommendation and trending engine.
///
/// Single-process, in-memory recomputation pipeline: interactions are
/// appended to the log, preferences update incrementally, and the affected
/// user's recommendation list regenerates immediately. A separate two-phase
/// batch cycle refreshes the shared trending/popularity caches and then
/// regenerates every user with at least one interaction.
///
/// Each user's recommendation set moves Empty → Generating → Ready;
/// Generating is internal to the generator and never observable — readers
/// see either no list or a complete one, never a partial overwrite.
///
/// Nothing is evicted: the log, preference map, and recommendation map grow
/// for the process lifetime. [`reset_preferences`] is the only explicit
/// shrink path; hosts needing bounded memory should recycle the engine.
///
/// [`reset_preferences`]: RecommendationEngine::reset_preferences
pub struct RecommendationEngine {
    config: EngineConfig,
    content: Arc<dyn ContentSource>,

    log: InteractionLog,
    preferences: PreferenceStore,

    trending_calc: TrendingCalculator,
    popularity: PopularityRanker,
    similarity: SimilarityEngine,
    generator: RecommendationGenerator,

    // Cycle caches: written once at the start of a batch cycle, read-only
    // for the remainder of it.
    trending_cache: RwLock<Arc<Vec<TrendingTopic>>>,
    popular_cache: RwLock<Arc<Vec<PopularEntry>>>,
    category_cache: RwLock<Arc<Vec<CategoryStats>>>,

    recommendations: DashMap<Uuid, Vec<ContentRecommendation>>,

    // Serializes batch cycles so overlapping triggers coalesce instead of
    // computing against two corpus snapshots at once.
    cycle_lock: Mutex<()>,
    corpus_dirty: AtomicBool,
    last_corpus_change: Mutex<Option<Instant>>,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig, content: Arc<dyn ContentSource>) -> Self {
        Self {
            trending_calc: TrendingCalculator::new(config.trending.clone()),
            popularity: PopularityRanker::new(config.popularity.clone()),
            similarity: SimilarityEngine::new(config.similarity.clone()),
            generator: RecommendationGenerator::new(config.generator.clone()),
            config,
            content,
            log: InteractionLog::new(),
            preferences: PreferenceStore::new(),
            trending_cache: RwLock::new(Arc::new(Vec::new())),
            popular_cache: RwLock::new(Arc::new(Vec::new())),
            category_cache: RwLock::new(Arc::new(Vec::new())),
            recommendations: DashMap::new(),
            cycle_lock: Mutex::new(()),
            corpus_dirty: AtomicBool::new(false),
            last_corpus_change: Mutex::new(None),
        }
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Record one interaction: append to the log, update the user's
    /// preferences, then regenerate that single user's recommendations.
    pub async fn record_interaction(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        content_type: ContentType,
        interaction_type: InteractionType,
    ) -> Result<()> {
        if user_id.is_nil() {
            return Err(EngineError::InvalidUserId(user_id.to_string()));
        }
        if content_id.is_nil() {
            return Err(EngineError::ContentNotFound(content_id));
        }

        let interaction = Interaction {
            user_id,
            content_id,
            content_type,
            interaction_type,
            weight: interaction_type.weight(),
            timestamp: Utc::now(),
        };

        self.mark_recommendation_acted(user_id, content_id, interaction_type);
        self.log.append(interaction.clone()).await;

        let corpus = self.content.snapshot().await?;
        let record = corpus.iter().find(|c| c.id == content_id);
        self.preferences.update(&interaction, record);

        let log = self.log.snapshot().await;
        let trending = self.trending_cache.read().await.clone();
        let popular = self.popular_cache.read().await.clone();
        self.regenerate_user(user_id, &corpus, &log, &trending, &popular)?;

        Ok(())
    }

    /// Flag an existing recommendation entry once the user acts on it.
    fn mark_recommendation_acted(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        interaction_type: InteractionType,
    ) {
        if let Some(mut entry) = self.recommendations.get_mut(&user_id) {
            if let Some(rec) = entry.iter_mut().find(|r| r.content_id == content_id) {
                if interaction_type == InteractionType::View {
                    rec.viewed = true;
                } else {
                    rec.interacted = true;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Batch cycle
    // ------------------------------------------------------------------

    /// Run one full recompute cycle.
    ///
    /// Phase one recomputes trending topics, category stats, and the
    /// popularity ranking exactly once against a single corpus and log
    /// snapshot. Phase two regenerates every distinct log user against
    /// those cached outputs; per-user failures are logged and isolated so
    /// one bad user never aborts the cycle for the rest.
    pub async fn run_batch_cycle(&self) -> Result<BatchCycleStats> {
        let _guard = self.cycle_lock.lock().await;
        let started = Instant::now();
        let mut stats = BatchCycleStats {
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        // Phase one: shared recompute.
        let corpus = self
            .content
            .snapshot()
            .await
            .map_err(|e| EngineError::CalculationFailed(e.to_string()))?;
        let log = self.log.snapshot().await;
        let now = Utc::now();

        let trending = Arc::new(self.trending_calc.calculate(&corpus, now));
        let categories = Arc::new(self.trending_calc.category_stats(&corpus, now));
        let popular = Arc::new(self.popularity.calculate(&corpus));

        stats.trending_topics = trending.len();
        stats.popular_items = popular.len();

        *self.trending_cache.write().await = trending.clone();
        *self.category_cache.write().await = categories;
        *self.popular_cache.write().await = popular.clone();

        // Phase two: per-user regeneration against the phase-one caches.
        let users = log.distinct_users();
        stats.users_processed = users.len();

        let succeeded = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        futures::stream::iter(users)
            .for_each_concurrent(self.config.batch.regeneration_concurrency, |user_id| {
                let corpus = &corpus;
                let log = &log;
                let trending = &trending;
                let popular = &popular;
                let succeeded = &succeeded;
                let failed = &failed;
                async move {
                    match self.regenerate_user(user_id, corpus, log, trending, popular) {
                        Ok(count) => {
                            debug!(user_id = %user_id, count, "User regenerated");
                            succeeded.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            warn!(user_id = %user_id, error = %e, "User regeneration failed");
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
            .await;

        stats.users_succeeded = succeeded.load(Ordering::Relaxed);
        stats.users_failed = failed.load(Ordering::Relaxed);
        stats.completed_at = Some(Utc::now());
        stats.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            trending_topics = stats.trending_topics,
            popular_items = stats.popular_items,
            users = stats.users_processed,
            succeeded = stats.users_succeeded,
            failed = stats.users_failed,
            duration_ms = stats.duration_ms,
            "Batch cycle completed"
        );

        Ok(stats)
    }

    /// Explicit corpus-change handler: marks the corpus dirty and arms the
    /// debounce window. The next [`tick`](RecommendationEngine::tick) after
    /// the window elapses runs a full cycle.
    pub async fn on_corpus_changed(&self) {
        self.corpus_dirty.store(true, Ordering::SeqCst);
        *self.last_corpus_change.lock().await = Some(Instant::now());
        debug!("Corpus change recorded, batch cycle pending");
    }

    /// Scheduler entry point. Runs a pending, debounced batch cycle if due;
    /// returns whether a cycle ran. A failed cycle stays pending so the
    /// next tick retries it.
    pub async fn tick(&self) -> Result<bool> {
        if !self.corpus_dirty.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let due = {
            let last_change = self.last_corpus_change.lock().await;
            match *last_change {
                Some(at) => at.elapsed().as_millis() as u64 >= self.config.batch.debounce_ms,
                None => true,
            }
        };
        if !due {
            return Ok(false);
        }

        self.corpus_dirty.store(false, Ordering::SeqCst);
        if let Err(e) = self.run_batch_cycle().await {
            self.corpus_dirty.store(true, Ordering::SeqCst);
            return Err(e);
        }
        Ok(true)
    }

    /// Regenerate one user's list against a consistent snapshot and
    /// atomically replace the previous list.
    fn regenerate_user(
        &self,
        user_id: Uuid,
        corpus: &[ContentRecord],
        log: &LogSnapshot,
        trending: &[TrendingTopic],
        popular: &[PopularEntry],
    ) -> Result<usize> {
        let prefs = self.preferences.get_or_default(user_id);
        let interacted = log.user_content_ids(user_id);

        let mut similar = self.similarity.find_similar(user_id, log);
        similar.truncate(self.config.similarity.max_similar_users);

        let ctx = StrategyContext {
            user_id,
            prefs: &prefs,
            corpus,
            interacted: &interacted,
            trending,
            popular,
            similar_users: &similar,
            log,
            config: &self.config.generator,
        };

        let (recommendations, stats) = self.generator.generate(&ctx);
        let count = stats.final_count;

        // Single map insert: readers see the old complete list or the new
        // one, never a mix.
        self.recommendations.insert(user_id, recommendations);
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------

    /// The user's current recommendations, score-descending, at most
    /// `limit`. A user with no interactions yet gets an empty list.
    pub fn get_recommendations(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ContentRecommendation>> {
        if user_id.is_nil() {
            return Err(EngineError::InvalidUserId(user_id.to_string()));
        }

        let mut recs = self
            .recommendations
            .get(&user_id)
            .map(|r| r.clone())
            .unwrap_or_default();
        recs.truncate(limit);
        Ok(recs)
    }

    /// Current trending topics, score-descending, at most `limit`.
    pub async fn get_trending_topics(&self, limit: usize) -> Vec<TrendingTopic> {
        let cache = self.trending_cache.read().await;
        cache.iter().take(limit).cloned().collect()
    }

    /// Head of the popularity ranking as content ids, optionally filtered
    /// by content type.
    pub async fn get_popular_content(
        &self,
        content_type: Option<ContentType>,
        limit: usize,
    ) -> Vec<Uuid> {
        let cache = self.popular_cache.read().await;
        cache
            .iter()
            .filter(|e| content_type.map_or(true, |t| e.content_type == t))
            .take(limit)
            .map(|e| e.content_id)
            .collect()
    }

    /// Visible content ids in a category, engagement-descending.
    pub async fn get_content_by_category(&self, category: &str, limit: usize) -> Result<Vec<Uuid>> {
        let corpus = self.content.snapshot().await?;
        let mut matching: Vec<&ContentRecord> = corpus
            .iter()
            .filter(|c| c.visible && c.category == category)
            .collect();
        matching.sort_by(|a, b| {
            b.engagement_score
                .partial_cmp(&a.engagement_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matching.into_iter().take(limit).map(|c| c.id).collect())
    }

    /// Windowed stats for one category, from the last batch cycle.
    pub async fn get_category_stats(&self, category: &str) -> Option<CategoryStats> {
        let cache = self.category_cache.read().await;
        cache.iter().find(|s| s.category == category).cloned()
    }

    pub fn preferences(&self, user_id: Uuid) -> Option<UserPreferences> {
        self.preferences.get(user_id)
    }

    /// Drop a user's taste profile. Their recommendation list is untouched
    /// until the next regeneration.
    pub fn reset_preferences(&self, user_id: Uuid) -> bool {
        self.preferences.reset(user_id)
    }

    pub async fn interaction_count(&self) -> usize {
        self.log.len().await
    }
}
