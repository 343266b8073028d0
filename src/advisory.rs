//! Non-fatal advisories emitted while resampling
use std::fmt;

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

use crate::Kernel;

/// # Non-fatal warnings
/// * every advisory is logged at `warn` level when it is emitted
/// * advisories are also returned to the caller, they never alter control flow
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum Advisory {
    /// Only the gaussian kernel has been validated against reference implementations
    UnvalidatedKernel(Kernel),

    /// The requested bandwidth was replaced by the minimum viable bandwidth
    BandwidthRaised {
        /// bandwidth the caller asked for
        requested: f64,
        /// bandwidth that was used instead
        adjusted: f64,
    },

    /// # The bandwidth leaves query points without any neighbor
    /// * the requested bandwidth is kept
    InsufficientBandwidth {
        /// bandwidth the caller asked for
        requested: f64,
        /// smallest integer bandwidth giving every listed query point a neighbor
        min_viable: f64,
        /// indices of the query points without neighbors
        query_indices: Vec<usize>,
    },
}

impl Advisory {
    /// Logs the advisory at `warn` level and hands it back
    pub(crate) fn emit(self) -> Self {
        log::warn!("{self}");
        self
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::UnvalidatedKernel(kernel) => write!(
                f,
                "kernel `{kernel}` has not been validated against reference implementations, \
                only `gaussian` has"
            ),
            Advisory::BandwidthRaised { requested, adjusted } => write!(
                f,
                "bandwidth {requested} leaves query points without neighbors, \
                raised to {adjusted}"
            ),
            Advisory::InsufficientBandwidth { requested, min_viable, query_indices } => write!(
                f,
                "bandwidth {requested} will result in the query indices {query_indices:?} \
                not having any values pooled. If this is not desired, use a bandwidth of \
                at least {min_viable}"
            ),
        }
    }
}
