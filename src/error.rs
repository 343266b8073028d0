use std::fmt;

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

use crate::*;

/// # Possible errors of a geographically weighted bootstrap
/// * any error aborts the whole call, there are no partial results
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum GeoBootstrapErrors {
    /// unsupported kernel or bandwidth mode
    Kernel(KernelErrors),
    /// unknown or invalid distance metric
    Distance(DistanceErrors),
    /// coordinates could not be extracted
    Coordinates(CoordinateErrors),
    /// weighted sampling failed
    Sampling(SamplingErrors),
    /// bandwidth has to be positive and finite
    InvalidBandwidth(f64),
    /// there is nothing to resample from
    EmptySource,
    /// number of source rows and source coordinates differ
    LengthMismatch{
        /// number of rows
        rows: usize,
        /// number of coordinates
        coordinates: usize,
    },
    /// # Bandwidth leaves query points without neighbors
    /// * only returned for [`BandwidthPolicy::Strict`]
    InsufficientBandwidth{
        /// bandwidth the caller asked for
        requested: f64,
        /// smallest integer bandwidth giving every query point a neighbor
        min_viable: f64,
        /// query points without neighbors
        query_indices: Vec<usize>,
    },
    /// The weights of this query point have no positive entry
    DegenerateWeights{
        /// index of the query point
        query_index: usize,
    },
}

impl fmt::Display for GeoBootstrapErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoBootstrapErrors::Kernel(e) => e.fmt(f),
            GeoBootstrapErrors::Distance(e) => e.fmt(f),
            GeoBootstrapErrors::Coordinates(e) => e.fmt(f),
            GeoBootstrapErrors::Sampling(e) => e.fmt(f),
            GeoBootstrapErrors::InvalidBandwidth(bw) => write!(
                f,
                "bandwidth has to be positive and finite, got {bw}"
            ),
            GeoBootstrapErrors::EmptySource => write!(f, "source collection is empty"),
            GeoBootstrapErrors::LengthMismatch { rows, coordinates } => write!(
                f,
                "{rows} source rows but {coordinates} source coordinates"
            ),
            GeoBootstrapErrors::InsufficientBandwidth { requested, min_viable, query_indices } => write!(
                f,
                "bandwidth {requested} leaves the query indices {query_indices:?} without neighbors, \
                the minimum viable bandwidth is {min_viable}"
            ),
            GeoBootstrapErrors::DegenerateWeights { query_index } => write!(
                f,
                "kernel weights of query point {query_index} have no positive entry"
            ),
        }
    }
}

impl std::error::Error for GeoBootstrapErrors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoBootstrapErrors::Kernel(e) => Some(e),
            GeoBootstrapErrors::Distance(e) => Some(e),
            GeoBootstrapErrors::Coordinates(e) => Some(e),
            GeoBootstrapErrors::Sampling(e) => Some(e),
            _ => None
        }
    }
}

impl From<KernelErrors> for GeoBootstrapErrors {
    fn from(e: KernelErrors) -> Self {
        GeoBootstrapErrors::Kernel(e)
    }
}

impl From<DistanceErrors> for GeoBootstrapErrors {
    fn from(e: DistanceErrors) -> Self {
        GeoBootstrapErrors::Distance(e)
    }
}

impl From<CoordinateErrors> for GeoBootstrapErrors {
    fn from(e: CoordinateErrors) -> Self {
        GeoBootstrapErrors::Coordinates(e)
    }
}

impl From<SamplingErrors> for GeoBootstrapErrors {
    fn from(e: SamplingErrors) -> Self {
        GeoBootstrapErrors::Sampling(e)
    }
}
