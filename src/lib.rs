//! # Geographically weighted bootstrap resampling
//! * for every query location, the source collection is resampled with replacement,
//!   each row weighted by a kernel of its distance to the query location
//! * kernels: triangular, uniform, quadratic, quartic, gaussian, bisquare, exponential
//! * bandwidth validation with a spatial index, optionally raising the bandwidth
//! * local bootstrap estimates, e.g. of a population density under spatial non-stationarity
//!
//! * [Detailed example](examples/index.html) estimating local population densities
//!
//! Coordinates have to be in a planar, distance preserving projection.
//! Only fixed bandwidths are supported.

#![deny(missing_docs)]

/// Non-fatal warnings, logged and returned to the caller
pub mod advisory;
pub mod kernel;
pub mod distance;
pub mod coordinates;
pub mod sampling;
pub mod bandwidth;
/// Errors of the geographically weighted bootstrap
pub mod error;

pub mod geobootstrap;
pub mod bootstrap;

pub use advisory::*;
pub use kernel::*;
pub use distance::*;
pub use coordinates::*;
pub use sampling::*;
pub use bandwidth::*;
pub use error::*;

pub use geobootstrap::*;
pub use bootstrap::*;

pub mod examples;
