//! Traits describing the remote service and navigation boundaries.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{Category, CategoryId, Destination, FilterParams, Point};
use crate::selection::SelectionSet;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the remote service.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Service answered with a non-success status.
    #[error("Unexpected status: {0}")]
    Status(u16),
    /// A coordinate in the response could not be read as a number.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Query parameters for fetching collection points.
pub struct PointsQuery {
    /// Two-letter state (UF) code.
    pub state: String,
    /// City name.
    pub city: String,
    /// Selected category ids, ascending. Empty means no category filter.
    pub items: Vec<CategoryId>,
}

impl PointsQuery {
    /// Build the query for the given filter and selection.
    #[must_use]
    pub fn new(params: &FilterParams, selection: &SelectionSet) -> Self {
        Self {
            state: params.state.clone(),
            city: params.city.clone(),
            items: selection.sorted_ids(),
        }
    }

    /// The query does not restrict categories.
    #[must_use]
    pub fn matches_all_categories(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
/// Source of the selectable waste-item categories.
pub trait CatalogPort: Send + Sync {
    /// Fetch all categories in display order.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails.
    async fn fetch_categories(&self) -> Result<Vec<Category>, PortError>;
}

#[async_trait]
/// Source of collection points.
pub trait PointsPort: Send + Sync {
    /// Fetch the points matching a state, city, and category filter.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails.
    async fn fetch_points(&self, query: &PointsQuery) -> Result<Vec<Point>, PortError>;
}

/// Navigation capability handed to the discovery flow.
pub trait Navigator: Send + Sync {
    /// Ask the navigation layer to open `destination`.
    fn navigate(&self, destination: Destination);
}
