//! Core types and the points discovery flow for the Ecoleta collection point finder.

/// Controller combining location, categories, and points into one view.
pub mod discovery;
/// One-shot device geolocation.
pub mod location;
/// Domain models and identifiers shared by all crates.
pub mod model;
/// Traits describing the remote service and navigation interfaces.
pub mod ports;
/// Toggle set of selected categories.
pub mod selection;

pub use discovery::*;
pub use location::*;
pub use model::*;
pub use ports::*;
pub use selection::*;
