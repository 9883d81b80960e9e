//! Core aggregation, styling, and layer-control logic for the FIRMS hotspot dashboard.
//!
//! Everything here is free of rendering and network code: feature collections come in
//! through a [`source::FeatureSource`], and every visible effect goes out through a
//! [`port::UiPort`], so the dashboard rules can be exercised without a window or a server.

pub mod aggregate;
pub mod controller;
pub mod feature;
pub mod overlay;
pub mod port;
pub mod prelude;
pub mod projection;
pub mod render;
pub mod source;
pub mod state;
pub mod style;
pub mod telemetry;

pub use aggregate::{aggregate, Summary};
pub use controller::Controller;
pub use feature::{Feature, FeatureCollection};
pub use prelude::{DashboardError, DashboardResult, FetchError};

#[cfg(test)]
pub(crate) mod testing;
