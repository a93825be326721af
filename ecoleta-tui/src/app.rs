use std::sync::Arc;

use chrono::{DateTime, Local};
use ecoleta_core::{
    discovery::{DiscoveryController, DiscoverySources, DiscoveryUpdate},
    location::GeolocationProvider,
    model::{Destination, FilterParams, PointId},
    ports::{CatalogPort, Navigator, PointsPort},
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::navigation::ChannelNavigator;

/// Maximum length of a state (UF) code.
const UF_LENGTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Home,
    Points,
    Detail(PointId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HomeField {
    Uf,
    City,
}

/// State and city form on the home screen.
#[derive(Debug, Clone)]
pub(crate) struct HomeForm {
    pub(crate) uf: String,
    pub(crate) city: String,
    pub(crate) focus: HomeField,
}

impl HomeForm {
    pub(crate) fn new(uf: &str, city: &str) -> Self {
        let mut form = Self {
            uf: String::new(),
            city: city.to_owned(),
            focus: HomeField::Uf,
        };
        uf.chars().for_each(|ch| form.push_uf(ch));
        form
    }

    pub(crate) fn push(&mut self, ch: char) {
        match self.focus {
            HomeField::Uf => self.push_uf(ch),
            HomeField::City => self.city.push(ch),
        }
    }

    pub(crate) fn pop(&mut self) {
        match self.focus {
            HomeField::Uf => self.uf.pop(),
            HomeField::City => self.city.pop(),
        };
    }

    pub(crate) fn switch_focus(&mut self) {
        self.focus = match self.focus {
            HomeField::Uf => HomeField::City,
            HomeField::City => HomeField::Uf,
        };
    }

    pub(crate) fn params(&self) -> FilterParams {
        FilterParams::new(self.uf.clone(), self.city.trim())
    }

    fn push_uf(&mut self, ch: char) {
        if self.uf.chars().count() < UF_LENGTH && ch.is_alphabetic() {
            self.uf.extend(ch.to_uppercase());
        }
    }
}

/// Everything the points screen needs to build a discovery controller.
pub(crate) struct Services {
    pub(crate) location: GeolocationProvider,
    pub(crate) catalog: Arc<dyn CatalogPort>,
    pub(crate) points: Arc<dyn PointsPort>,
}

pub(crate) struct App {
    services: Services,
    navigator: Arc<ChannelNavigator>,
    destinations: UnboundedReceiver<Destination>,

    pub(crate) screen: Screen,
    pub(crate) home: HomeForm,

    pub(crate) discovery: Option<DiscoveryController>,
    pub(crate) category_index: usize,
    pub(crate) point_index: usize,
    pub(crate) points_updated_at: Option<DateTime<Local>>,

    pub(crate) error_message: Option<String>,
}

impl App {
    pub(crate) fn new(services: Services, home: HomeForm) -> Self {
        let (navigator, destinations) = ChannelNavigator::new();
        Self {
            services,
            navigator: Arc::new(navigator),
            destinations,
            screen: Screen::Home,
            home,
            discovery: None,
            category_index: 0,
            point_index: 0,
            points_updated_at: None,
            error_message: None,
        }
    }

    /// Leave the home form and start discovering points for it.
    pub(crate) fn open_points(&mut self) {
        let params = self.home.params();
        info!(state = %params.state, city = %params.city, "opening points screen");

        let navigator: Arc<dyn Navigator> = self.navigator.clone();
        let sources = DiscoverySources {
            location: self.services.location.clone(),
            catalog: Arc::clone(&self.services.catalog),
            points: Arc::clone(&self.services.points),
            navigator,
        };

        let mut discovery = DiscoveryController::new(sources, params);
        discovery.start();

        self.discovery = Some(discovery);
        self.category_index = 0;
        self.point_index = 0;
        self.points_updated_at = None;
        self.error_message = None;
        self.screen = Screen::Points;
    }

    /// Apply finished background work and queued navigation.
    pub(crate) fn tick(&mut self) {
        let updates = self
            .discovery
            .as_mut()
            .map(DiscoveryController::apply_pending)
            .unwrap_or_default();
        for update in updates {
            self.handle_update(update);
        }

        while let Ok(destination) = self.destinations.try_recv() {
            self.navigate(destination);
        }

        self.clamp_cursors();
    }

    pub(crate) fn toggle_current_category(&mut self) {
        let Some(discovery) = self.discovery.as_mut() else {
            return;
        };
        let Some(id) = discovery
            .view()
            .categories
            .get(self.category_index)
            .map(|category| category.id)
        else {
            return;
        };
        discovery.toggle_category(id);
    }

    pub(crate) fn open_current_point(&mut self) {
        let Some(discovery) = self.discovery.as_ref() else {
            return;
        };
        match discovery.view().visible_points().get(self.point_index) {
            Some(point) => discovery.open_point_detail(point.id),
            None => self.error_message = Some("No point selected".into()),
        }
    }

    pub(crate) fn go_back(&mut self) {
        match (self.screen, self.discovery.as_ref()) {
            (Screen::Points, Some(discovery)) => discovery.go_back(),
            (Screen::Detail(_) | Screen::Points, _) => self.navigator.navigate(Destination::Back),
            (Screen::Home, _) => {}
        }
    }

    pub(crate) fn move_category(&mut self, forward: bool) {
        let count = self.category_count();
        self.category_index = step(self.category_index, count, forward);
    }

    pub(crate) fn move_point(&mut self, forward: bool) {
        let count = self.visible_point_count();
        self.point_index = step(self.point_index, count, forward);
    }

    fn handle_update(&mut self, update: DiscoveryUpdate) {
        match update {
            DiscoveryUpdate::PointsLoaded { .. } => {
                self.points_updated_at = Some(Local::now());
                self.error_message = None;
            }
            DiscoveryUpdate::PointsFailed { message, .. } => {
                self.error_message = Some(format!("Failed to load points: {message}"));
            }
            DiscoveryUpdate::CategoriesFailed { message } => {
                self.error_message = Some(format!("Failed to load categories: {message}"));
            }
            DiscoveryUpdate::LocationFailed(err) => {
                self.error_message = Some(format!("Could not get your location: {err}"));
            }
            DiscoveryUpdate::LocationResolved(_)
            | DiscoveryUpdate::PermissionDenied
            | DiscoveryUpdate::CategoriesLoaded { .. }
            | DiscoveryUpdate::StalePointsDiscarded { .. } => {}
        }
    }

    fn navigate(&mut self, destination: Destination) {
        match destination {
            Destination::PointDetail { point_id } => {
                self.screen = Screen::Detail(point_id);
            }
            Destination::Back => match self.screen {
                Screen::Detail(_) => self.screen = Screen::Points,
                Screen::Points => {
                    self.discovery = None;
                    self.error_message = None;
                    self.screen = Screen::Home;
                }
                Screen::Home => {}
            },
        }
    }

    fn clamp_cursors(&mut self) {
        self.category_index = self
            .category_index
            .min(self.category_count().saturating_sub(1));
        self.point_index = self
            .point_index
            .min(self.visible_point_count().saturating_sub(1));
    }

    fn category_count(&self) -> usize {
        self.discovery
            .as_ref()
            .map_or(0, |discovery| discovery.view().categories.len())
    }

    fn visible_point_count(&self) -> usize {
        self.discovery
            .as_ref()
            .map_or(0, |discovery| discovery.view().visible_points().len())
    }
}

fn step(index: usize, count: usize, forward: bool) -> usize {
    if forward {
        if index + 1 < count { index + 1 } else { index }
    } else {
        index.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use ecoleta_core::{
        model::{Category, CategoryId, Coordinate, Point},
        ports::{PointsQuery, PortError},
    };

    use super::*;
    use crate::device::ConfiguredDevice;

    struct StaticCatalog;

    #[async_trait]
    impl CatalogPort for StaticCatalog {
        async fn fetch_categories(&self) -> Result<Vec<Category>, PortError> {
            Ok(vec![Category {
                id: CategoryId(1),
                title: "Lâmpadas".into(),
                icon_uri: "lampadas.svg".into(),
            }])
        }
    }

    struct StaticPoints;

    #[async_trait]
    impl PointsPort for StaticPoints {
        async fn fetch_points(&self, query: &PointsQuery) -> Result<Vec<Point>, PortError> {
            Ok(vec![Point {
                id: PointId(42),
                image_uri: "mercado.jpg".into(),
                name: "Mercado".into(),
                city: query.city.clone(),
                state: query.state.clone(),
                latitude: -23.5,
                longitude: -46.6,
            }])
        }
    }

    fn app() -> App {
        let services = Services {
            location: GeolocationProvider::new(Arc::new(ConfiguredDevice::new(Some(
                Coordinate::new(-23.5, -46.6),
            )))),
            catalog: Arc::new(StaticCatalog),
            points: Arc::new(StaticPoints),
        };
        App::new(services, HomeForm::new("sp", "Sao Paulo"))
    }

    async fn settle(app: &mut App) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        app.tick();
    }

    #[test]
    fn uf_is_uppercased_and_capped() {
        let mut form = HomeForm::new("", "");
        for ch in "rj9x".chars() {
            form.push(ch);
        }
        assert_eq!(form.uf, "RJ");

        form.switch_focus();
        for ch in " Rio ".chars() {
            form.push(ch);
        }
        form.pop();
        assert_eq!(form.city, " Rio");
        assert_eq!(form.params(), FilterParams::new("RJ", "Rio"));
    }

    #[test]
    fn step_stays_in_bounds() {
        assert_eq!(step(0, 3, false), 0);
        assert_eq!(step(2, 3, true), 2);
        assert_eq!(step(1, 3, true), 2);
        assert_eq!(step(0, 0, true), 0);
    }

    #[tokio::test]
    async fn navigates_between_home_points_and_detail() {
        let mut app = app();
        assert_eq!(app.home.uf, "SP");

        app.open_points();
        assert_eq!(app.screen, Screen::Points);
        settle(&mut app).await;
        assert!(app.points_updated_at.is_some());

        app.toggle_current_category();
        settle(&mut app).await;
        let selected = app
            .discovery
            .as_ref()
            .map(|discovery| discovery.view().is_selected(CategoryId(1)));
        assert_eq!(selected, Some(true));

        app.open_current_point();
        app.tick();
        assert_eq!(app.screen, Screen::Detail(PointId(42)));

        app.go_back();
        app.tick();
        assert_eq!(app.screen, Screen::Points);

        app.go_back();
        app.tick();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.discovery.is_none());
    }
}
