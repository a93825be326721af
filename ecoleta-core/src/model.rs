//! Domain data structures for categories, collection points, and map coordinates.

use std::fmt;

/// Default latitude/longitude span shown around the device position.
pub const DEFAULT_REGION_DELTA: f64 = 0.014;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identifier of a selectable waste-item category.
pub struct CategoryId(pub u32);

impl fmt::Display for CategoryId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Identifier of a collection point.
pub struct PointId(pub u32);

impl fmt::Display for PointId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Waste-item category used to filter collection points.
pub struct Category {
    /// Unique identifier.
    pub id: CategoryId,
    /// Display title, e.g. "Lâmpadas".
    pub title: String,
    /// Location of the category icon.
    pub icon_uri: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Physical collection point returned by the points service.
pub struct Point {
    /// Unique identifier.
    pub id: PointId,
    /// Location of the point's photo.
    pub image_uri: String,
    /// Name of the establishment.
    pub name: String,
    /// City the point is located in.
    pub city: String,
    /// Two-letter state (UF) code.
    pub state: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Point {
    /// Position of the point as a coordinate.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Latitude/longitude pair in decimal degrees.
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Placeholder used until the device reports a real position.
    pub const SENTINEL: Coordinate = Coordinate {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Build a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::SENTINEL
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Visible map area centred on the device position.
pub struct MapRegion {
    /// Centre of the region.
    pub center: Coordinate,
    /// Latitude span of the region.
    pub latitude_delta: f64,
    /// Longitude span of the region.
    pub longitude_delta: f64,
}

impl MapRegion {
    /// Region around `center` with the default span.
    #[must_use]
    pub const fn around(center: Coordinate) -> Self {
        Self {
            center,
            latitude_delta: DEFAULT_REGION_DELTA,
            longitude_delta: DEFAULT_REGION_DELTA,
        }
    }

    /// Whether `coordinate` falls inside the region.
    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (coordinate.latitude - self.center.latitude).abs() <= self.latitude_delta / 2.0
            && (coordinate.longitude - self.center.longitude).abs() <= self.longitude_delta / 2.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// State and city filter handed over by the home screen.
pub struct FilterParams {
    /// Two-letter state (UF) code.
    pub state: String,
    /// City name.
    pub city: String,
}

impl FilterParams {
    /// Construct filter params from a state and a city.
    #[must_use]
    pub fn new<S: Into<String>, C: Into<String>>(state: S, city: C) -> Self {
        Self {
            state: state.into(),
            city: city.into(),
        }
    }

    /// Both fields are present, so points can be queried.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.state.trim().is_empty() && !self.city.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Screens the discovery flow can ask the navigation layer to open.
pub enum Destination {
    /// Return to the previous screen.
    Back,
    /// Detail view for a single collection point.
    PointDetail {
        /// Point to show.
        point_id: PointId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_params_require_both_fields() {
        assert!(FilterParams::new("SP", "Sao Paulo").is_complete());
        assert!(!FilterParams::new("", "Sao Paulo").is_complete());
        assert!(!FilterParams::new("SP", "  ").is_complete());
        assert!(!FilterParams::default().is_complete());
    }

    #[test]
    fn region_contains_points_within_half_delta() {
        let region = MapRegion::around(Coordinate::new(-23.5, -46.6));
        assert!(region.contains(Coordinate::new(-23.503, -46.605)));
        assert!(!region.contains(Coordinate::new(-23.6, -46.6)));
    }

    #[test]
    fn sentinel_is_default() {
        assert_eq!(Coordinate::default(), Coordinate::SENTINEL);
    }
}
