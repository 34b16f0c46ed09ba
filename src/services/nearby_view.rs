use mockall::automock;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::geo::{Coordinate, format_distance, haversine_distance};
use crate::domain::search::{DiscoveryFilter, SearchRadius};
use crate::domain::sheet::{BottomSheet, SheetLayout};
use crate::domain::spatial::MarkerIndex;
use crate::domain::task::MapTask;
use crate::domain::viewport::{MapController, MapViewport};
use crate::repository::preferences_repository::PreferencesRepository;
use crate::services::discovery::{DiscoveryState, RefreshOutcome, TaskDiscovery};
use crate::services::geolocation::{LocationProvider, resolve_location};
use crate::services::task_api::TaskApi;

/// How close (km) a tap must land to a pin to select it.
const TAP_TOLERANCE_KM: f64 = 0.15;

/// Route changes requested by the view. The host application decides how to show them.
#[automock]
pub trait Navigator: Send + Sync {
    fn open_task(&self, task_id: Uuid);
    fn create_task(&self);
}

/// The "tasks near me" screen: map, pins and the list sheet on top of it.
pub struct NearbyTasksView<A: TaskApi> {
    discovery: TaskDiscovery<A>,
    preferences: PreferencesRepository,
    location: Arc<dyn LocationProvider>,
    navigator: Arc<dyn Navigator>,
    config: AppConfig,
    map: MapController,
    sheet: BottomSheet,
    filter: DiscoveryFilter,
    index: MarkerIndex,
    selected: Option<Uuid>,
}

impl<A: TaskApi> NearbyTasksView<A> {
    pub fn new(
        api: Arc<A>,
        preferences: PreferencesRepository,
        location: Arc<dyn LocationProvider>,
        navigator: Arc<dyn Navigator>,
        config: AppConfig,
        viewport_height: f64,
    ) -> Self {
        let filter = DiscoveryFilter::new(config.default_location, SearchRadius::default());
        Self {
            discovery: TaskDiscovery::new(api),
            preferences,
            location,
            navigator,
            config,
            map: MapController::new(),
            sheet: BottomSheet::new(SheetLayout::default(), viewport_height),
            filter,
            index: MarkerIndex::build(&[]),
            selected: None,
        }
    }

    /// Resolve where we are, restore the last radius, and load the first page of pins.
    pub async fn mount(&mut self) -> RefreshOutcome {
        self.mount_with(None, None).await
    }

    /// Like [`mount`](Self::mount), with the radius and category fixed up front.
    /// A given radius is persisted. Either way exactly one list request is made.
    pub async fn mount_with(&mut self, radius: Option<SearchRadius>, category: Option<String>) -> RefreshOutcome {
        let origin = resolve_location(
            self.location.as_ref(),
            self.config.geolocation_timeout(),
            self.config.default_location,
        )
        .await;

        if origin != self.config.default_location {
            if let Err(e) = self.preferences.set_last_known_location(origin).await {
                warn!(error = %e, "Could not store last known location");
            }
        }

        let radius = match radius {
            Some(radius) => {
                if let Err(e) = self.preferences.set_search_radius(radius).await {
                    warn!(error = %e, "Could not persist search radius");
                }
                radius
            }
            None => match self.preferences.get_search_radius().await {
                Ok(stored) => stored.unwrap_or_default(),
                Err(e) => {
                    warn!(error = %e, "Could not read stored search radius");
                    SearchRadius::default()
                }
            },
        };

        info!(%origin, %radius, category = ?category, "Mounting nearby tasks view");
        self.filter.origin = origin;
        self.filter.radius = radius;
        self.filter.category = category;
        self.reload().await
    }

    pub async fn set_radius(&mut self, radius: SearchRadius) -> Option<RefreshOutcome> {
        if let Err(e) = self.preferences.set_search_radius(radius).await {
            warn!(error = %e, "Could not persist search radius");
        }
        if radius == self.filter.radius {
            return None;
        }
        self.filter.radius = radius;
        Some(self.reload().await)
    }

    pub async fn set_category(&mut self, category: Option<String>) -> Option<RefreshOutcome> {
        if category == self.filter.category {
            return None;
        }
        self.filter.category = category;
        Some(self.reload().await)
    }

    /// Move the search origin, e.g. after picking an address suggestion.
    pub async fn set_origin(&mut self, origin: Coordinate) -> Option<RefreshOutcome> {
        if origin == self.filter.origin {
            return None;
        }
        self.filter.origin = origin;
        Some(self.reload().await)
    }

    /// Refetch with the current filter. Also the manual recovery path after an error.
    pub async fn reload(&mut self) -> RefreshOutcome {
        if let Some(viewport) = self.map.update(self.filter.origin, self.filter.radius) {
            debug!(center = %viewport.center, zoom = viewport.zoom, "Map recentered");
        }

        let outcome = self.discovery.refresh(&self.filter).await;
        if let RefreshOutcome::Loaded(_) = outcome {
            let tasks = self.discovery.tasks();
            self.index = MarkerIndex::build(&tasks);
            if self.selected.is_some_and(|id| !tasks.iter().any(|t| t.id() == id)) {
                self.selected = None;
            }
        }
        outcome
    }

    /// Highlight a pin and drop the sheet so the map is visible.
    pub fn select_task(&mut self, task_id: Uuid) -> bool {
        let Some(marker) = self.marker(task_id) else {
            return false;
        };

        self.selected = Some(task_id);
        self.sheet.collapse();
        self.map.focus(marker.display);
        true
    }

    /// Map tap: select whichever pin is under the finger.
    pub fn select_at(&mut self, point: Coordinate) -> Option<Uuid> {
        let task_id = self.index.nearest(&point, TAP_TOLERANCE_KM)?;
        self.select_task(task_id);
        Some(task_id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn open_task(&self, task_id: Uuid) {
        self.navigator.open_task(task_id);
    }

    pub fn create_task(&self) {
        self.navigator.create_task();
    }

    pub fn distance_label(&self, marker: &MapTask) -> String {
        format_distance(haversine_distance(&self.filter.origin, &marker.task.coordinate()))
    }

    pub fn markers(&self) -> Vec<MapTask> {
        self.discovery.tasks()
    }

    fn marker(&self, task_id: Uuid) -> Option<MapTask> {
        self.discovery.tasks().into_iter().find(|m| m.id() == task_id)
    }

    pub fn state(&self) -> DiscoveryState {
        self.discovery.state()
    }

    pub fn filter(&self) -> &DiscoveryFilter {
        &self.filter
    }

    pub fn viewport(&self) -> Option<MapViewport> {
        self.map.viewport()
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn sheet(&self) -> &BottomSheet {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut BottomSheet {
        &mut self.sheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sheet::SnapPosition;
    use crate::domain::task::Task;
    use crate::repository::database::init_test_database;
    use crate::services::geolocation::{FixedLocation, NoLocation};
    use crate::services::task_api::MockTaskApi;

    async fn prefs() -> PreferencesRepository {
        PreferencesRepository::new(init_test_database().await.unwrap())
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("Paint fence".into(), Some("painting".into()), 80.0, Coordinate::new(56.9500, 24.1050)),
            Task::new("Move sofa".into(), Some("moving".into()), 40.0, Coordinate::new(56.9700, 24.1500)),
        ]
    }

    #[tokio::test]
    async fn test_mount_uses_stored_radius_and_fallback_location() {
        let repo = prefs().await;
        repo.set_search_radius(SearchRadius(25)).await.unwrap();

        let fixed = tasks();
        let mut api = MockTaskApi::new();
        api.expect_list_tasks()
            .withf(|q| q.radius_km == 25 && q.latitude == 56.9496)
            .times(1)
            .returning(move |_| Ok(fixed.clone()));

        let mut view = NearbyTasksView::new(
            Arc::new(api),
            repo.clone(),
            Arc::new(NoLocation),
            Arc::new(MockNavigator::new()),
            AppConfig::default(),
            800.0,
        );

        assert_eq!(view.mount().await, RefreshOutcome::Loaded(2));
        assert_eq!(view.viewport().unwrap().zoom, 11);
        // Fallback positions are not remembered as real fixes
        assert_eq!(repo.get_last_known_location().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_radius_change_persists_and_refetches() {
        let repo = prefs().await;
        let mut api = MockTaskApi::new();
        api.expect_list_tasks().times(2).returning(|_| Ok(vec![]));

        let here = Coordinate::new(56.95, 24.10);
        let mut view = NearbyTasksView::new(
            Arc::new(api),
            repo.clone(),
            Arc::new(FixedLocation(here)),
            Arc::new(MockNavigator::new()),
            AppConfig::default(),
            800.0,
        );
        view.mount().await;
        assert_eq!(repo.get_last_known_location().await.unwrap(), Some(here));

        // Same radius as the default: stored, but no second request
        assert_eq!(view.set_radius(SearchRadius(10)).await, None);
        assert!(view.set_radius(SearchRadius::UNBOUNDED).await.is_some());

        assert_eq!(repo.get_search_radius().await.unwrap(), Some(SearchRadius::UNBOUNDED));
        assert_eq!(view.viewport().unwrap().zoom, crate::domain::viewport::COUNTRY_ZOOM);
    }

    #[tokio::test]
    async fn test_select_collapses_sheet_and_navigation_callbacks() {
        let fixed = tasks();
        let target = fixed[1].id;
        let mut api = MockTaskApi::new();
        api.expect_list_tasks().returning(move |_| Ok(fixed.clone()));

        let mut navigator = MockNavigator::new();
        navigator.expect_open_task().withf(move |id| *id == target).times(1).return_const(());
        navigator.expect_create_task().times(1).return_const(());

        let mut view = NearbyTasksView::new(
            Arc::new(api),
            prefs().await,
            Arc::new(NoLocation),
            Arc::new(navigator),
            AppConfig::default(),
            800.0,
        );
        view.mount().await;

        view.sheet_mut().begin_drag(500.0);
        view.sheet_mut().drag_to(300.0);

        assert!(view.select_task(target));
        assert_eq!(view.sheet().position(), SnapPosition::Min);
        assert_eq!(view.selected(), Some(target));
        assert_eq!(view.viewport().unwrap().center, Coordinate::new(56.9700, 24.1500));

        assert!(!view.select_task(Uuid::new_v4()));

        view.open_task(target);
        view.create_task();
    }

    #[tokio::test]
    async fn test_tap_selects_nearest_pin_and_labels_distance() {
        let fixed = tasks();
        let first = fixed[0].id;
        let mut api = MockTaskApi::new();
        api.expect_list_tasks().returning(move |_| Ok(fixed.clone()));

        let mut view = NearbyTasksView::new(
            Arc::new(api),
            prefs().await,
            Arc::new(FixedLocation(Coordinate::new(56.95, 24.10))),
            Arc::new(MockNavigator::new()),
            AppConfig::default(),
            800.0,
        );
        view.mount().await;

        assert_eq!(view.select_at(Coordinate::new(56.9501, 24.1049)), Some(first));
        assert_eq!(view.select_at(Coordinate::new(57.5, 25.0)), None);

        let markers = view.markers();
        assert_eq!(view.distance_label(&markers[0]), "303m");
        assert_eq!(view.distance_label(&markers[1]), "3.8km");
    }

    #[tokio::test]
    async fn test_mount_with_overrides_fetches_once() {
        let repo = prefs().await;
        repo.set_search_radius(SearchRadius(5)).await.unwrap();

        let mut api = MockTaskApi::new();
        api.expect_list_tasks()
            .withf(|q| q.radius_km == 25 && q.category.as_deref() == Some("moving"))
            .times(1)
            .returning(|_| Ok(vec![]));

        let mut view = NearbyTasksView::new(
            Arc::new(api),
            repo.clone(),
            Arc::new(NoLocation),
            Arc::new(MockNavigator::new()),
            AppConfig::default(),
            800.0,
        );

        let outcome = view.mount_with(Some(SearchRadius(25)), Some("moving".into())).await;
        assert_eq!(outcome, RefreshOutcome::Loaded(0));
        assert_eq!(view.filter().category.as_deref(), Some("moving"));
        assert_eq!(repo.get_search_radius().await.unwrap(), Some(SearchRadius(25)));
    }

    #[tokio::test]
    async fn test_category_change_refetches_once() {
        let mut api = MockTaskApi::new();
        api.expect_list_tasks()
            .withf(|q| q.category.is_none())
            .times(1)
            .returning(|_| Ok(vec![]));
        api.expect_list_tasks()
            .withf(|q| q.category.as_deref() == Some("moving"))
            .times(1)
            .returning(|_| Ok(vec![]));

        let mut view = NearbyTasksView::new(
            Arc::new(api),
            prefs().await,
            Arc::new(NoLocation),
            Arc::new(MockNavigator::new()),
            AppConfig::default(),
            800.0,
        );
        view.mount().await;

        assert!(view.set_category(Some("moving".into())).await.is_some());
        assert!(view.set_category(Some("moving".into())).await.is_none());
    }
}
