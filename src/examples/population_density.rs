//! # Synthetic census tracts
//! A square region split into `side × side` tracts. The population density
//! grows from the south west corner towards the north east corner, so local
//! statistics differ across the region.
use geo::{Geometry, Rect, Coord};
use rand::Rng;

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

/// One census tract
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct Tract {
    /// row of the tract
    pub id: usize,
    /// inhabitants per square kilometre
    pub pop_density: f64,
}

/// Tracts together with their outlines
#[derive(Debug, Clone)]
pub struct TractMap {
    /// attributes of every tract
    pub tracts: Vec<Tract>,
    /// outline of every tract, index aligned with `tracts`
    pub outlines: Vec<Geometry<f64>>,
}

impl TractMap {
    /// # Grid of `side × side` square tracts, each `size` metres wide
    /// * density is `x + y` in kilometres plus uniform noise in `[0, noise)`
    pub fn new<R>(mut rng: R, side: usize, size: f64, noise: f64) -> Self
    where R: Rng
    {
        let mut tracts = Vec::with_capacity(side * side);
        let mut outlines = Vec::with_capacity(side * side);
        for i in 0..side {
            for j in 0..side {
                let min = Coord { x: i as f64 * size, y: j as f64 * size };
                let max = Coord { x: min.x + size, y: min.y + size };
                let trend = (min.x + min.y) / 1000.0;
                let jitter = if noise > 0.0 {
                    rng.random_range(0.0..noise)
                } else {
                    0.0
                };
                tracts.push(Tract { id: tracts.len(), pop_density: trend + jitter });
                outlines.push(Geometry::Rect(Rect::new(min, max)));
            }
        }
        Self{
            tracts,
            outlines,
        }
    }

    /// number of tracts
    pub fn len(&self) -> usize
    {
        self.tracts.len()
    }

    /// true if there are no tracts
    pub fn is_empty(&self) -> bool
    {
        self.tracts.is_empty()
    }
}
