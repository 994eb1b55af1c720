use crate::core::{partition, Clock, FilterEngine};
use crate::models::{FilterCriteria, FilteredResult, Profile};
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::source::{ProfileSource, RestProfileSource, SourceError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Default freshness window for the collection and detail entries
pub const DEFAULT_STALE_AFTER_SECS: i64 = 3600;

/// Store shared between the composition root and its coordinators
pub type SharedStore<S = RestProfileSource> = Arc<Mutex<ProfileStore<S>>>;

/// Lifecycle of the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Empty,
    Loading,
    Ready,
    Stale,
}

/// Published view of the store, read by rendering consumers
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub status: StoreStatus,
    pub result: Arc<FilteredResult>,
    pub error: Option<String>,
    pub last_fetch: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionSnapshot {
    profiles: Vec<Profile>,
    #[serde(rename = "fetchedAt")]
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedProfile {
    profile: Profile,
    #[serde(rename = "fetchedAt")]
    fetched_at: DateTime<Utc>,
}

/// Single owner of the profile collection and its freshness
///
/// The collection is replaced wholesale by [`ProfileStore::load_all`]; every other
/// component sees it through the published [`StoreSnapshot`] or a borrowed slice.
/// Fetch failures never escape: they are recorded in the published error field
/// and the last good collection stays in place.
pub struct ProfileStore<S = RestProfileSource> {
    source: Arc<S>,
    cache: Arc<CacheManager>,
    clock: Arc<dyn Clock>,
    engine: FilterEngine,
    stale_after: Duration,
    profiles: Vec<Profile>,
    last_fetch: Option<DateTime<Utc>>,
    result: Arc<FilteredResult>,
    error: Option<String>,
    loading: bool,
    refresh_pending: bool,
    publisher: watch::Sender<StoreSnapshot>,
}

impl<S: ProfileSource> ProfileStore<S> {
    pub fn new(source: S, cache: Arc<CacheManager>, clock: Arc<dyn Clock>, stale_after: Duration) -> Self {
        let (publisher, _) = watch::channel(StoreSnapshot {
            status: StoreStatus::Empty,
            result: Arc::new(FilteredResult::default()),
            error: None,
            last_fetch: None,
        });

        Self {
            source: Arc::new(source),
            cache,
            clock,
            engine: FilterEngine::new(),
            stale_after,
            profiles: Vec::new(),
            last_fetch: None,
            result: Arc::new(FilteredResult::default()),
            error: None,
            loading: false,
            refresh_pending: false,
            publisher,
        }
    }

    /// Hydrate from the persisted collection snapshot, if any
    pub async fn init(&mut self) {
        if let Some(snapshot) = self
            .cache
            .load::<CollectionSnapshot>(&CacheKey::collection())
            .await
        {
            tracing::info!(
                "Restored {} cached profiles fetched at {}",
                snapshot.profiles.len(),
                snapshot.fetched_at
            );
            self.profiles = snapshot.profiles;
            self.last_fetch = Some(snapshot.fetched_at);
            self.result = Arc::new(partition(&self.profiles));
        }

        self.publish();
    }

    /// Fetch the full collection, replacing the stored one on success
    ///
    /// Returns whether the fetch succeeded. On failure the existing collection is
    /// kept and the error is published. Holding `&mut self` keeps the store busy for
    /// the whole fetch; shared stores go through [`refresh`] instead.
    pub async fn load_all(&mut self) -> bool {
        let source = self.begin_load();
        let outcome = source.fetch_all().await;
        self.finish_load(outcome).await
    }

    /// Mark a fetch in flight and hand out the source to run it
    fn begin_load(&mut self) -> Arc<S> {
        self.loading = true;
        self.publish();
        Arc::clone(&self.source)
    }

    async fn finish_load(&mut self, outcome: Result<Vec<Profile>, SourceError>) -> bool {
        self.loading = false;

        match outcome {
            Ok(profiles) => {
                let fetched_at = self.clock.now();
                tracing::info!("Loaded {} profiles", profiles.len());

                self.profiles = profiles;
                self.last_fetch = Some(fetched_at);
                self.error = None;
                self.result = Arc::new(partition(&self.profiles));
                self.publish();

                let snapshot = CollectionSnapshot {
                    profiles: self.profiles.clone(),
                    fetched_at,
                };
                if let Err(e) = self.cache.set(&CacheKey::collection(), &snapshot).await {
                    tracing::warn!("Failed to persist profile collection: {}", e);
                }
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load profiles (keeping {} cached): {}",
                    self.profiles.len(),
                    e
                );
                self.error = Some(e.to_string());
                self.publish();
                false
            }
        }
    }

    /// Claim the single background refresh slot; false if one is already pending
    pub fn claim_background_refresh(&mut self) -> bool {
        if self.refresh_pending {
            return false;
        }
        self.refresh_pending = true;
        true
    }

    pub fn release_background_refresh(&mut self) {
        self.refresh_pending = false;
    }

    pub fn background_refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// True when empty, never fetched, or older than the freshness window
    pub fn is_stale(&self) -> bool {
        match self.last_fetch {
            _ if self.profiles.is_empty() => true,
            None => true,
            Some(fetched_at) => self.is_expired(fetched_at),
        }
    }

    fn is_expired(&self, fetched_at: DateTime<Utc>) -> bool {
        self.clock.now() - fetched_at > self.stale_after
    }

    /// Filter the collection and publish the result
    pub fn apply_filters(&mut self, criteria: &FilterCriteria) -> Arc<FilteredResult> {
        self.result = Arc::new(self.engine.apply(&self.profiles, criteria));
        self.publish();
        Arc::clone(&self.result)
    }

    /// Look up one profile's details
    ///
    /// A fresh per-profile cache entry wins; otherwise the backend is asked and the
    /// answer cached. If that fails, a stale entry or the bulk collection is used.
    pub async fn profile(&self, id: &str) -> Option<Profile> {
        let key = CacheKey::profile(id);
        let cached = self.cache.load::<CachedProfile>(&key).await;

        if let Some(entry) = &cached {
            if !self.is_expired(entry.fetched_at) {
                return Some(entry.profile.clone());
            }
        }

        match self.source.fetch_one(id).await {
            Ok(profile) => {
                let entry = CachedProfile {
                    profile,
                    fetched_at: self.clock.now(),
                };
                if let Err(e) = self.cache.set(&key, &entry).await {
                    tracing::warn!("Failed to cache profile {}: {}", id, e);
                }
                Some(entry.profile)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch profile {}: {}", id, e);
                cached
                    .map(|entry| entry.profile)
                    .or_else(|| self.profiles.iter().find(|p| p.id == id).cloned())
            }
        }
    }

    /// Persist the last applied criteria
    pub async fn save_criteria(&self, criteria: &FilterCriteria) {
        if let Err(e) = self.cache.set(&CacheKey::criteria(), criteria).await {
            tracing::warn!("Failed to persist filter criteria: {}", e);
        }
    }

    /// Last persisted criteria, or the defaults
    pub async fn saved_criteria(&self) -> FilterCriteria {
        self.cache
            .load::<FilterCriteria>(&CacheKey::criteria())
            .await
            .map(FilterCriteria::normalized)
            .unwrap_or_default()
    }

    pub fn status(&self) -> StoreStatus {
        if self.loading {
            StoreStatus::Loading
        } else if self.profiles.is_empty() {
            StoreStatus::Empty
        } else if self.is_stale() {
            StoreStatus::Stale
        } else {
            StoreStatus::Ready
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            status: self.status(),
            result: Arc::clone(&self.result),
            error: self.error.clone(),
            last_fetch: self.last_fetch,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.publisher.subscribe()
    }

    fn publish(&self) {
        self.publisher.send_replace(self.snapshot());
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn result(&self) -> Arc<FilteredResult> {
        Arc::clone(&self.result)
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Drop the in-memory collection; persisted entries are left for the next session
    pub fn dispose(&mut self) {
        tracing::debug!("Disposing profile store ({} profiles)", self.profiles.len());
        self.profiles = Vec::new();
        self.last_fetch = None;
        self.error = None;
        self.loading = false;
        self.result = Arc::new(FilteredResult::default());
        self.publish();
    }
}

/// Reload a shared store without holding its lock across the fetch
///
/// The lock is taken only to mark the load and again to swap in the outcome, so
/// readers keep seeing the current collection while the backend is slow. When
/// two refreshes overlap, the last one to finish wins.
pub async fn refresh<S: ProfileSource>(store: &SharedStore<S>) -> bool {
    let source = store.lock().await.begin_load();
    let outcome = source.fetch_all().await;
    store.lock().await.finish_load(outcome).await
}
