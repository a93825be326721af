//! Points discovery: location, categories, and points combined into one view.
//!
//! The controller owns every piece of screen state. Each asynchronous source runs
//! as its own task and reports back over a channel; results are only applied when
//! the owner calls [`DiscoveryController::next_update`] or
//! [`DiscoveryController::apply_pending`], so state has a single writer.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::location::{GeolocationProvider, LocationError};
use crate::model::{
    Category, CategoryId, Coordinate, Destination, FilterParams, MapRegion, Point, PointId,
};
use crate::ports::{CatalogPort, Navigator, PointsPort, PointsQuery, PortError};
use crate::selection::SelectionSet;

/// Collaborators the discovery flow depends on.
pub struct DiscoverySources {
    /// Device geolocation.
    pub location: GeolocationProvider,
    /// Category catalog.
    pub catalog: Arc<dyn CatalogPort>,
    /// Collection point search.
    pub points: Arc<dyn PointsPort>,
    /// Navigation capability.
    pub navigator: Arc<dyn Navigator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Loading state of a single data source.
pub enum SourceStatus {
    /// Nothing has been requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The latest request succeeded.
    Ready,
    /// The latest request failed.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
/// What changed after a source result was applied.
pub enum DiscoveryUpdate {
    /// The device position is known.
    LocationResolved(Coordinate),
    /// The user refused location access; a notice must be shown.
    PermissionDenied,
    /// Permission was granted but the fix failed.
    LocationFailed(LocationError),
    /// Categories arrived.
    CategoriesLoaded {
        /// Number of categories received.
        count: usize,
    },
    /// The category request failed; the filter row stays empty.
    CategoriesFailed {
        /// Error description.
        message: String,
    },
    /// The newest points request succeeded and replaced the list.
    PointsLoaded {
        /// Generation of the applied request.
        generation: u64,
        /// Number of points received.
        count: usize,
    },
    /// The newest points request failed; the previous list was kept.
    PointsFailed {
        /// Generation of the failed request.
        generation: u64,
        /// Error description.
        message: String,
    },
    /// A superseded points response arrived and was ignored.
    StalePointsDiscarded {
        /// Generation of the discarded response.
        generation: u64,
    },
}

enum SourceResult {
    Location(Result<Coordinate, LocationError>),
    Categories(Result<Vec<Category>, PortError>),
    Points {
        generation: u64,
        result: Result<Vec<Point>, PortError>,
    },
}

/// Render-ready snapshot derived from the controller state.
#[derive(Debug, Clone, Copy)]
pub struct ViewModel<'state> {
    /// Filter the screen was opened with.
    pub params: &'state FilterParams,
    /// Device position, or [`Coordinate::SENTINEL`] before a fix.
    pub coordinate: Coordinate,
    /// Selectable categories in service order.
    pub categories: &'state [Category],
    /// Latest applied points.
    pub points: &'state [Point],
    /// Currently selected categories.
    pub selection: &'state SelectionSet,
    /// Location permission was refused.
    pub permission_notice: bool,
    /// Status of the location source.
    pub location_status: SourceStatus,
    /// Status of the category source.
    pub categories_status: SourceStatus,
    /// Status of the points source.
    pub points_status: SourceStatus,
}

impl<'state> ViewModel<'state> {
    /// Map region to render, available only once a real fix arrived.
    #[must_use]
    pub fn map_region(&self) -> Option<MapRegion> {
        (self.location_status == SourceStatus::Ready).then(|| MapRegion::around(self.coordinate))
    }

    /// Points to draw as map markers. Empty while the map is not rendered.
    #[must_use]
    pub fn visible_points(&self) -> &'state [Point] {
        if self.map_region().is_some() {
            self.points
        } else {
            &[]
        }
    }

    /// Whether `id` is part of the current selection.
    #[must_use]
    pub fn is_selected(&self, id: CategoryId) -> bool {
        self.selection.contains(id)
    }
}

/// State machine behind the points screen.
pub struct DiscoveryController {
    sources: DiscoverySources,
    params: FilterParams,
    selection: SelectionSet,

    coordinate: Coordinate,
    location_status: SourceStatus,
    permission_notice: bool,

    categories: Vec<Category>,
    categories_status: SourceStatus,

    points: Vec<Point>,
    points_status: SourceStatus,
    latest_generation: u64,

    started: bool,
    results_tx: UnboundedSender<SourceResult>,
    results_rx: UnboundedReceiver<SourceResult>,
}

impl DiscoveryController {
    /// Create a controller for the filter received from navigation.
    #[must_use]
    pub fn new(sources: DiscoverySources, params: FilterParams) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            sources,
            params,
            selection: SelectionSet::new(),
            coordinate: Coordinate::SENTINEL,
            location_status: SourceStatus::Idle,
            permission_notice: false,
            categories: Vec::new(),
            categories_status: SourceStatus::Idle,
            points: Vec::new(),
            points_status: SourceStatus::Idle,
            latest_generation: 0,
            started: false,
            results_tx,
            results_rx,
        }
    }

    /// Launch location, categories, and the first points request.
    ///
    /// Must be called from within a Tokio runtime. Later calls do nothing, so
    /// location and categories are requested once per controller.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        info!(state = %self.params.state, city = %self.params.city, "starting discovery");

        self.location_status = SourceStatus::Loading;
        let location = self.sources.location.clone();
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = location.acquire().await;
            if results.send(SourceResult::Location(result)).is_err() {
                debug!("discovery closed before the location result arrived");
            }
        });

        self.categories_status = SourceStatus::Loading;
        let catalog = Arc::clone(&self.sources.catalog);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = catalog.fetch_categories().await;
            if results.send(SourceResult::Categories(result)).is_err() {
                debug!("discovery closed before categories arrived");
            }
        });

        self.request_points();
    }

    /// Toggle a category and query points for the new selection.
    pub fn toggle_category(&mut self, id: CategoryId) {
        self.selection = self.selection.toggle(id);
        debug!(category = %id, selected = self.selection.contains(id), "category toggled");
        self.request_points();
    }

    /// Replace the navigation filter, querying points when it changed.
    pub fn update_params(&mut self, params: FilterParams) {
        if params == self.params {
            return;
        }
        self.params = params;

        if !self.params.is_complete() {
            // Responses still in flight belong to the previous filter.
            self.latest_generation += 1;
            self.points = Vec::new();
            self.points_status = SourceStatus::Idle;
            debug!("filter cleared, dropping points for the previous filter");
            return;
        }
        self.request_points();
    }

    /// Navigate to the detail screen of a point.
    pub fn open_point_detail(&self, point_id: PointId) {
        self.sources
            .navigator
            .navigate(Destination::PointDetail { point_id });
    }

    /// Navigate back to the previous screen.
    pub fn go_back(&self) {
        self.sources.navigator.navigate(Destination::Back);
    }

    /// Wait for the next source result and apply it.
    ///
    /// Waits indefinitely while a source is hung; returns `None` only if the
    /// result channel is closed.
    pub async fn next_update(&mut self) -> Option<DiscoveryUpdate> {
        let result = self.results_rx.recv().await?;
        Some(self.apply(result))
    }

    /// Apply every result that has already arrived, without waiting.
    pub fn apply_pending(&mut self) -> Vec<DiscoveryUpdate> {
        let mut updates = Vec::new();
        loop {
            match self.results_rx.try_recv() {
                Ok(result) => updates.push(self.apply(result)),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        updates
    }

    /// Current render-ready view.
    #[must_use]
    pub fn view(&self) -> ViewModel<'_> {
        ViewModel {
            params: &self.params,
            coordinate: self.coordinate,
            categories: &self.categories,
            points: &self.points,
            selection: &self.selection,
            permission_notice: self.permission_notice,
            location_status: self.location_status,
            categories_status: self.categories_status,
            points_status: self.points_status,
        }
    }

    /// Look up an applied point by id.
    #[must_use]
    pub fn point(&self, point_id: PointId) -> Option<&Point> {
        self.points.iter().find(|point| point.id == point_id)
    }

    fn request_points(&mut self) {
        if !self.params.is_complete() {
            debug!("filter incomplete, not querying points");
            return;
        }

        self.latest_generation += 1;
        let generation = self.latest_generation;
        let query = PointsQuery::new(&self.params, &self.selection);
        self.points_status = SourceStatus::Loading;

        debug!(generation, items = ?query.items, "requesting points");

        let port = Arc::clone(&self.sources.points);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = port.fetch_points(&query).await;
            if results
                .send(SourceResult::Points { generation, result })
                .is_err()
            {
                debug!(generation, "discovery closed before points arrived");
            }
        });
    }

    fn apply(&mut self, result: SourceResult) -> DiscoveryUpdate {
        match result {
            SourceResult::Location(Ok(coordinate)) => {
                info!(%coordinate, "device located");
                self.coordinate = coordinate;
                self.location_status = SourceStatus::Ready;
                DiscoveryUpdate::LocationResolved(coordinate)
            }
            SourceResult::Location(Err(LocationError::PermissionDenied)) => {
                warn!("location permission denied, map stays hidden");
                self.location_status = SourceStatus::Failed;
                self.permission_notice = true;
                DiscoveryUpdate::PermissionDenied
            }
            SourceResult::Location(Err(err)) => {
                warn!(error = %err, "failed to locate device");
                self.location_status = SourceStatus::Failed;
                DiscoveryUpdate::LocationFailed(err)
            }
            SourceResult::Categories(Ok(categories)) => {
                info!(count = categories.len(), "categories loaded");
                self.categories = categories;
                self.categories_status = SourceStatus::Ready;
                DiscoveryUpdate::CategoriesLoaded {
                    count: self.categories.len(),
                }
            }
            SourceResult::Categories(Err(err)) => {
                warn!(error = %err, "failed to load categories");
                self.categories_status = SourceStatus::Failed;
                DiscoveryUpdate::CategoriesFailed {
                    message: err.to_string(),
                }
            }
            SourceResult::Points { generation, .. } if generation != self.latest_generation => {
                debug!(
                    generation,
                    latest = self.latest_generation,
                    "discarding stale points response"
                );
                DiscoveryUpdate::StalePointsDiscarded { generation }
            }
            SourceResult::Points {
                generation,
                result: Ok(points),
            } => {
                info!(generation, count = points.len(), "points loaded");
                self.points = points;
                self.points_status = SourceStatus::Ready;
                DiscoveryUpdate::PointsLoaded {
                    generation,
                    count: self.points.len(),
                }
            }
            SourceResult::Points {
                generation,
                result: Err(err),
            } => {
                warn!(generation, error = %err, "failed to load points, keeping previous list");
                self.points_status = SourceStatus::Failed;
                DiscoveryUpdate::PointsFailed {
                    generation,
                    message: err.to_string(),
                }
            }
        }
    }
}
