use crate::core::{bucket_by_tier, order_for_display, TierBuckets};
use crate::models::criteria::constraint;
use crate::models::{FilterCriteria, FilteredResult, Profile};
use crate::services::source::{ProfileSource, RestProfileSource};
use crate::services::store::{refresh, ProfileStore, SharedStore, StoreStatus};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Whether the held criteria have been pushed to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPhase {
    Draft,
    Applied,
}

/// Ordered sequences ready for rendering
#[derive(Debug, Clone)]
pub struct ListingView {
    pub profiles: Vec<Profile>,
    pub spas: Vec<Profile>,
    pub total_count: usize,
    pub has_active_filters: bool,
}

/// Bridges user input, the shareable URL and the profile store
///
/// Only the category and the specific service travel through the URL. The
/// county is separate view state that joins the criteria whenever they are
/// applied. Criteria are persisted only for resumed sessions; a coordinator
/// built straight from a URL serves one request and leaves the saved state alone.
pub struct ViewStateCoordinator<S = RestProfileSource> {
    store: SharedStore<S>,
    base_path: String,
    criteria: FilterCriteria,
    county: Option<String>,
    phase: FilterPhase,
    url: String,
    retry_delay: Duration,
    persist_criteria: bool,
    applied: FilterCriteria,
    result: Arc<FilteredResult>,
    applied_at: DateTime<Utc>,
}

impl<S: ProfileSource + 'static> ViewStateCoordinator<S> {
    /// Reconstruct view state from a path with an optional query string
    pub fn from_url(store: SharedStore<S>, url: &str, retry_delay: Duration) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let criteria = FilterCriteria::from_query_string(query);

        let mut coordinator = Self {
            store,
            base_path: path.to_string(),
            criteria,
            county: None,
            phase: FilterPhase::Draft,
            url: String::new(),
            retry_delay,
            persist_criteria: false,
            applied: FilterCriteria::default(),
            result: Arc::new(FilteredResult::default()),
            applied_at: Utc::now(),
        };
        coordinator.rewrite_url();
        coordinator
    }

    /// Like [`Self::from_url`], but a URL without parameters restores the last
    /// applied criteria and county (page reload rather than navigation). Applied
    /// criteria are saved again for the next resume.
    pub async fn resume(store: SharedStore<S>, url: &str, retry_delay: Duration) -> Self {
        let mut coordinator = Self::from_url(store, url, retry_delay);
        coordinator.persist_criteria = true;

        if !coordinator.criteria.has_active_filters() {
            let saved = coordinator.store.lock().await.saved_criteria().await;
            coordinator.county = saved.county.clone();
            coordinator.criteria = FilterCriteria { county: None, ..saved };
            coordinator.rewrite_url();
        }

        coordinator
    }

    /// Load the collection if needed, then apply the current criteria
    ///
    /// With nothing to show, the load runs inline and a failure is retried once
    /// after the retry delay. With stale data present, the stale collection is
    /// applied right away and a single background refresh is started.
    pub async fn mount(&mut self) -> StoreStatus {
        let handle = Arc::clone(&self.store);
        let (stale, empty) = {
            let mut store = handle.lock().await;
            let stale = store.is_stale();
            let empty = store.profiles().is_empty();
            if stale && !empty && store.claim_background_refresh() {
                self.spawn_background_refresh();
            }
            (stale, empty)
        };

        if stale && empty && !refresh(&handle).await {
            tracing::info!("Profile load failed with no data, retrying in {:?}", self.retry_delay);
            tokio::time::sleep(self.retry_delay).await;
            let still_empty = handle.lock().await.profiles().is_empty();
            if still_empty {
                refresh(&handle).await;
            }
        }

        let mut store = handle.lock().await;
        self.apply_with(&mut store).await;
        store.status()
    }

    /// Refresh in the background, retrying once after the delay on failure
    ///
    /// The caller must hold the store's background refresh slot.
    fn spawn_background_refresh(&self) {
        let handle = Arc::clone(&self.store);
        let delay = self.retry_delay;

        tokio::spawn(async move {
            tracing::debug!("Background refresh of stale profiles");
            if !refresh(&handle).await {
                tokio::time::sleep(delay).await;
                let still_stale = handle.lock().await.is_stale();
                if still_stale {
                    tracing::debug!("Background retry of profile load");
                    refresh(&handle).await;
                }
            }
            handle.lock().await.release_background_refresh();
        });
    }

    /// Replace the held criteria and rewrite the URL
    ///
    /// With `apply_immediately` false the criteria stay a draft until [`Self::apply`].
    pub async fn update_filters(&mut self, criteria: FilterCriteria, apply_immediately: bool) {
        self.criteria = FilterCriteria {
            county: None,
            ..criteria.normalized()
        };
        self.phase = FilterPhase::Draft;
        self.rewrite_url();

        if apply_immediately {
            self.apply().await;
        }
    }

    /// Set the county view state; takes effect on the next apply
    pub fn update_county(&mut self, county: Option<&str>) {
        self.county = constraint(county);
    }

    /// Push the held criteria (plus county) to the store
    pub async fn apply(&mut self) -> Arc<FilteredResult> {
        let handle = Arc::clone(&self.store);
        let mut store = handle.lock().await;
        self.apply_with(&mut store).await
    }

    async fn apply_with(&mut self, store: &mut ProfileStore<S>) -> Arc<FilteredResult> {
        let criteria = self.effective_criteria();
        self.result = store.apply_filters(&criteria);
        self.applied_at = store.now();
        self.phase = FilterPhase::Applied;
        if self.persist_criteria {
            store.save_criteria(&criteria).await;
        }
        self.applied = criteria;
        Arc::clone(&self.result)
    }

    /// Manual retry affordance: reload and re-apply
    pub async fn retry(&mut self) -> bool {
        let handle = Arc::clone(&self.store);
        let loaded = refresh(&handle).await;
        let mut store = handle.lock().await;
        self.apply_with(&mut store).await;
        loaded
    }

    /// Held criteria with the county view state merged in
    pub fn effective_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            county: self.county.clone(),
            ..self.criteria.clone()
        }
    }

    /// Whether the held (possibly draft) criteria constrain anything
    pub fn has_active_filters(&self) -> bool {
        self.effective_criteria().has_active_filters()
    }

    /// Order the last applied result for display
    ///
    /// The shuffle policy follows the criteria that produced the result, not a
    /// pending draft.
    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> ListingView {
        let has_active_filters = self.applied.has_active_filters();

        ListingView {
            profiles: order_for_display(
                self.result.profiles.clone(),
                has_active_filters,
                self.applied_at,
                rng,
            ),
            spas: self.result.spas.clone(),
            total_count: self.result.total_count,
            has_active_filters,
        }
    }

    /// Non-spa matches of the last applied result grouped by package tier
    pub fn tiers(&self) -> TierBuckets {
        bucket_by_tier(&self.result.profiles, self.applied_at)
    }

    fn rewrite_url(&mut self) {
        let query = self.criteria.to_query_string();
        self.url = if query.is_empty() {
            self.base_path.clone()
        } else {
            format!("{}?{}", self.base_path, query)
        };
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Criteria behind the current result
    pub fn applied_criteria(&self) -> &FilterCriteria {
        &self.applied
    }

    pub fn county(&self) -> Option<&str> {
        self.county.as_deref()
    }

    pub fn phase(&self) -> FilterPhase {
        self.phase
    }

    pub fn result(&self) -> Arc<FilteredResult> {
        Arc::clone(&self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use crate::models::{Category, Location};
    use crate::services::cache::CacheManager;
    use crate::services::source::SourceError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::sync::Mutex;

    struct StaticSource(Vec<Profile>);

    impl ProfileSource for StaticSource {
        async fn fetch_all(&self) -> Result<Vec<Profile>, SourceError> {
            Ok(self.0.clone())
        }

        async fn fetch_one(&self, id: &str) -> Result<Profile, SourceError> {
            Err(SourceError::NotFound(id.to_string()))
        }
    }

    fn create_profile(id: &str, category: Category, county: &str) -> Profile {
        Profile {
            id: id.to_string(),
            category,
            username: None,
            gender: None,
            age: Some(24),
            body_type: None,
            breast_size: None,
            ethnicity: None,
            sexual_orientation: None,
            serves_who: None,
            service_type: None,
            services: vec![],
            location: Location {
                county: Some(county.to_string()),
                ..Location::default()
            },
            current_package: None,
            phone: None,
            whatsapp: false,
        }
    }

    fn create_store() -> SharedStore<StaticSource> {
        let source = StaticSource(vec![
            create_profile("1", Category::Escort, "Nairobi"),
            create_profile("2", Category::Masseuse, "Mombasa"),
            create_profile("3", Category::Spa, "Nairobi"),
        ]);
        Arc::new(Mutex::new(ProfileStore::new(
            source,
            Arc::new(CacheManager::in_memory(100, 86_400)),
            Arc::new(ManualClock::default()),
            chrono::Duration::hours(1),
        )))
    }

    #[tokio::test]
    async fn test_mount_loads_and_applies() {
        let mut coordinator = ViewStateCoordinator::from_url(create_store(), "/listings", Duration::from_millis(1));

        let status = coordinator.mount().await;

        assert_eq!(status, StoreStatus::Ready);
        assert_eq!(coordinator.phase(), FilterPhase::Applied);
        assert_eq!(coordinator.result().total_count, 3);
        assert!(!coordinator.has_active_filters());
    }

    #[tokio::test]
    async fn test_draft_until_applied() {
        let mut coordinator = ViewStateCoordinator::from_url(create_store(), "/listings", Duration::from_millis(1));
        coordinator.mount().await;

        coordinator
            .update_filters(FilterCriteria::default().with_category(Category::Masseuse), false)
            .await;
        assert_eq!(coordinator.phase(), FilterPhase::Draft);
        assert_eq!(coordinator.url(), "/listings?userType=masseuse");
        assert_eq!(coordinator.result().total_count, 3);

        coordinator.apply().await;
        assert_eq!(coordinator.phase(), FilterPhase::Applied);
        assert_eq!(coordinator.result().total_count, 1);
    }

    #[tokio::test]
    async fn test_county_applies_on_next_apply() {
        let mut coordinator = ViewStateCoordinator::from_url(create_store(), "/listings", Duration::from_millis(1));
        coordinator.mount().await;

        coordinator.update_county(Some("nairobi"));
        assert_eq!(coordinator.result().total_count, 3);
        assert_eq!(coordinator.url(), "/listings");

        let result = coordinator.apply().await;
        assert_eq!(result.profiles.len(), 1);
        assert_eq!(result.spas.len(), 1);
        assert!(coordinator.has_active_filters());
    }

    #[tokio::test]
    async fn test_render_is_stable_with_active_filters() {
        let mut coordinator = ViewStateCoordinator::from_url(create_store(), "/listings?userType=escort", Duration::from_millis(1));
        coordinator.mount().await;
        let mut rng = StdRng::seed_from_u64(1);

        let first = coordinator.render(&mut rng);
        let second = coordinator.render(&mut rng);

        let ids = |view: &ListingView| view.profiles.iter().map(|p| p.id.clone()).collect::<Vec<_>>();
        assert!(first.has_active_filters);
        assert_eq!(ids(&first), vec!["1"]);
        assert_eq!(ids(&first), ids(&second));
    }

    #[tokio::test]
    async fn test_resume_restores_saved_criteria() {
        let store = create_store();
        let mut coordinator = ViewStateCoordinator::resume(Arc::clone(&store), "/listings", Duration::from_millis(1)).await;
        coordinator.mount().await;
        coordinator.update_county(Some("Mombasa"));
        coordinator
            .update_filters(FilterCriteria::default().with_category(Category::Masseuse), true)
            .await;

        let resumed = ViewStateCoordinator::resume(store, "/listings", Duration::from_millis(1)).await;

        assert_eq!(resumed.criteria().category, Some(Category::Masseuse));
        assert_eq!(resumed.county(), Some("Mombasa"));
        assert_eq!(resumed.url(), "/listings?userType=masseuse");
    }

    #[tokio::test]
    async fn test_url_coordinator_does_not_persist_criteria() {
        let store = create_store();
        let mut session = ViewStateCoordinator::resume(Arc::clone(&store), "/listings", Duration::from_millis(1)).await;
        session.mount().await;
        session
            .update_filters(FilterCriteria::default().with_category(Category::Masseuse), true)
            .await;

        let mut request = ViewStateCoordinator::from_url(Arc::clone(&store), "/listings?userType=spa", Duration::from_millis(1));
        request.mount().await;
        assert_eq!(request.result().spas.len(), 1);

        let saved = store.lock().await.saved_criteria().await;
        assert_eq!(saved.category, Some(Category::Masseuse));
    }

    #[tokio::test]
    async fn test_render_policy_follows_applied_criteria() {
        let mut coordinator = ViewStateCoordinator::from_url(create_store(), "/listings", Duration::from_millis(1));
        coordinator.mount().await;

        coordinator.update_county(Some("nairobi"));
        coordinator
            .update_filters(FilterCriteria::default().with_category(Category::Escort), false)
            .await;
        let mut rng = StdRng::seed_from_u64(7);

        assert!(coordinator.has_active_filters());
        let draft_view = coordinator.render(&mut rng);
        assert!(!draft_view.has_active_filters);
        assert_eq!(draft_view.total_count, 3);

        coordinator.apply().await;
        let applied_view = coordinator.render(&mut rng);
        assert!(applied_view.has_active_filters);
        assert_eq!(applied_view.total_count, 1);
        assert_eq!(coordinator.applied_criteria().county.as_deref(), Some("nairobi"));
    }

    #[tokio::test]
    async fn test_tiers_group_applied_profiles() {
        let mut coordinator = ViewStateCoordinator::from_url(create_store(), "/listings", Duration::from_millis(1));
        coordinator.mount().await;

        let tiers = coordinator.tiers();
        assert_eq!(tiers.regular.len(), 2);
        assert!(tiers.elite.is_empty());
    }
}
