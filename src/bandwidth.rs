//! # Bandwidth validation
//! A fixed bandwidth is only useful if every query point pools values from at
//! least one source point. A source point at the exact location of the query
//! point is the query point "itself" and does not count as a neighbor.
//!
//! If some query points have no neighbor, the minimum viable bandwidth is the
//! largest nearest neighbor distance among them, rounded up to the next integer.
use rstar::RTree;

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

use crate::*;

/// # What to do if the bandwidth leaves query points without neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum BandwidthPolicy {
    /// fail with [`GeoBootstrapErrors::InsufficientBandwidth`]
    Strict,
    /// emit [`Advisory::InsufficientBandwidth`] and keep the bandwidth
    Warn,
    /// emit [`Advisory::BandwidthRaised`] and use the minimum viable bandwidth
    AutoFix,
}

/// Result of [`BandwidthValidator::check`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct BandwidthCheck {
    /// bandwidth that was checked
    pub bandwidth: f64,
    /// query points without a neighbor, ascending
    pub isolated: Vec<usize>,
    /// # smallest integer bandwidth giving every isolated query point a neighbor
    /// * `None` if nothing is isolated
    pub min_viable: Option<f64>,
}

impl BandwidthCheck {
    /// true if every query point has a neighbor
    pub fn is_sufficient(&self) -> bool
    {
        self.isolated.is_empty()
    }
}

/// # Bandwidth to use for the rest of a call
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct BandwidthReport {
    /// requested or raised bandwidth
    pub bandwidth: f64,
    /// advisories emitted during validation
    pub advisories: Vec<Advisory>,
}

/// # Spatial index over the source coordinates
/// * read only after construction
pub struct BandwidthValidator {
    tree: RTree<Coord2>,
}

impl BandwidthValidator {
    /// Builds the index, `Err` if `source_coords` is empty
    pub fn new(source_coords: &[Coord2]) -> Result<Self, GeoBootstrapErrors>
    {
        if source_coords.is_empty() {
            return Err(GeoBootstrapErrors::EmptySource);
        }
        Ok(
            Self{
                tree: RTree::bulk_load(source_coords.to_vec())
            }
        )
    }

    /// number of indexed source points
    pub fn len(&self) -> usize
    {
        self.tree.size()
    }

    /// always false, an empty source is rejected by [`BandwidthValidator::new`]
    pub fn is_empty(&self) -> bool
    {
        self.tree.size() == 0
    }

    /// # Number of source points within the closed radius `bandwidth` of `query`
    /// * a source point coincident with `query` is not counted
    pub fn neighbor_count(&self, query: &Coord2, bandwidth: f64, metric: DistanceMetric) -> usize
    {
        // candidates are filtered with the exact metric below
        let cover = metric.euclidean_cover(bandwidth) * (1.0 + 1e-9);
        self.tree
            .locate_within_distance(*query, cover * cover)
            .filter(|point| {
                let d = metric.distance(query, point);
                d > 0.0 && d <= bandwidth
            })
            .count()
    }

    /// # Distance to the nearest source point not coincident with `query`
    /// * `None` if every source point is coincident with `query`
    pub fn nearest_distance(&self, query: &Coord2, metric: DistanceMetric) -> Option<f64>
    {
        match metric {
            DistanceMetric::Euclidean | DistanceMetric::SqEuclidean => self.tree
                .nearest_neighbor_iter(query)
                .map(|point| metric.distance(query, point))
                .find(|&d| d > 0.0),
            _ => self.tree
                .iter()
                .map(|point| metric.distance(query, point))
                .filter(|&d| d > 0.0)
                .min_by(f64::total_cmp)
        }
    }

    /// # Finds the query points without a neighbor within `bandwidth`
    pub fn check(&self, query_coords: &[Coord2], bandwidth: f64, metric: DistanceMetric) -> BandwidthCheck
    {
        let mut isolated = Vec::new();
        let mut max_nearest: Option<f64> = None;
        for (index, query) in query_coords.iter().enumerate() {
            if self.neighbor_count(query, bandwidth, metric) > 0 {
                continue;
            }
            if let Some(nearest) = self.nearest_distance(query, metric) {
                isolated.push(index);
                max_nearest = Some(max_nearest.map_or(nearest, |m| m.max(nearest)));
            }
        }
        log::debug!(
            "bandwidth {bandwidth}: {} of {} query points without neighbors",
            isolated.len(),
            query_coords.len()
        );
        BandwidthCheck{
            bandwidth,
            isolated,
            min_viable: max_nearest.map(f64::ceil),
        }
    }

    /// # Checks `bandwidth` and applies `policy`
    /// * see [`validate_bandwidth_with_metric`]
    pub fn validate(
        &self,
        query_coords: &[Coord2],
        bandwidth: f64,
        metric: DistanceMetric,
        policy: BandwidthPolicy
    ) -> Result<BandwidthReport, GeoBootstrapErrors>
    {
        check_bandwidth_value(bandwidth)?;
        let check = self.check(query_coords, bandwidth, metric);
        let min_viable = match check.min_viable {
            None => return Ok(BandwidthReport { bandwidth, advisories: Vec::new() }),
            Some(min_viable) => min_viable
        };

        match policy {
            BandwidthPolicy::Strict => Err(
                GeoBootstrapErrors::InsufficientBandwidth {
                    requested: bandwidth,
                    min_viable,
                    query_indices: check.isolated
                }
            ),
            BandwidthPolicy::Warn => {
                let advisory = Advisory::InsufficientBandwidth {
                    requested: bandwidth,
                    min_viable,
                    query_indices: check.isolated
                }.emit();
                Ok(BandwidthReport { bandwidth, advisories: vec![advisory] })
            },
            BandwidthPolicy::AutoFix => {
                let advisory = Advisory::BandwidthRaised {
                    requested: bandwidth,
                    adjusted: min_viable
                }.emit();
                Ok(BandwidthReport { bandwidth: min_viable, advisories: vec![advisory] })
            }
        }
    }
}

/// `Err` unless the bandwidth is positive and finite
pub(crate) fn check_bandwidth_value(bandwidth: f64) -> Result<(), GeoBootstrapErrors>
{
    if bandwidth.is_finite() && bandwidth > 0.0 {
        Ok(())
    } else {
        Err(GeoBootstrapErrors::InvalidBandwidth(bandwidth))
    }
}

/// # Validate a bandwidth with euclidean distances
/// * see [`validate_bandwidth_with_metric`]
pub fn validate_bandwidth(
    source_coords: &[Coord2],
    query_coords: &[Coord2],
    bandwidth: f64,
    policy: BandwidthPolicy
) -> Result<BandwidthReport, GeoBootstrapErrors>
{
    validate_bandwidth_with_metric(source_coords, query_coords, bandwidth, DistanceMetric::Euclidean, policy)
}

/// # Verify every query point has a neighbor within `bandwidth`
/// * builds a fresh spatial index over `source_coords`
/// * returns the bandwidth to use: the requested one, or the minimum viable one for
///   [`BandwidthPolicy::AutoFix`]
/// * `Err` for an empty source, an invalid bandwidth, or an insufficient bandwidth
///   under [`BandwidthPolicy::Strict`]
pub fn validate_bandwidth_with_metric(
    source_coords: &[Coord2],
    query_coords: &[Coord2],
    bandwidth: f64,
    metric: DistanceMetric,
    policy: BandwidthPolicy
) -> Result<BandwidthReport, GeoBootstrapErrors>
{
    check_bandwidth_value(bandwidth)?;
    BandwidthValidator::new(source_coords)?
        .validate(query_coords, bandwidth, metric, policy)
}

#[cfg(test)]
mod tests{
    use super::*;

    const SQUARE: [Coord2; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

    fn grid(n: usize, spacing: f64) -> Vec<Coord2>
    {
        (0..n)
            .flat_map(|i| (0..n).map(move |j| [i as f64 * spacing, j as f64 * spacing]))
            .collect()
    }

    #[test]
    fn autofix_raises_to_nearest_neighbor()
    {
        let report = validate_bandwidth(&SQUARE, &[[0.0, 0.0]], 0.1, BandwidthPolicy::AutoFix)
            .unwrap();
        assert_eq!(report.bandwidth, 1.0);
        assert_eq!(
            report.advisories,
            vec![Advisory::BandwidthRaised { requested: 0.1, adjusted: 1.0 }]
        );
    }

    #[test]
    fn sufficient_bandwidth_is_kept()
    {
        for policy in [BandwidthPolicy::Strict, BandwidthPolicy::Warn, BandwidthPolicy::AutoFix] {
            // ties at exactly the bandwidth count as neighbors
            let report = validate_bandwidth(&SQUARE, &SQUARE, 1.0, policy).unwrap();
            assert_eq!(report.bandwidth, 1.0);
            assert!(report.advisories.is_empty());
        }
    }

    #[test]
    fn strict_and_warn()
    {
        let source = grid(5, 1.0);
        let query = vec![[0.0, 0.0], [2.5, 2.5], [1.0, 0.4], [10.0, 2.0]];

        let err = validate_bandwidth(&source, &query, 0.5, BandwidthPolicy::Strict).unwrap_err();
        // nearest neighbors: 1, √0.5, 0.4 (inside), 6
        assert_eq!(
            err,
            GeoBootstrapErrors::InsufficientBandwidth {
                requested: 0.5,
                min_viable: 6.0,
                query_indices: vec![0, 1, 3]
            }
        );

        let report = validate_bandwidth(&source, &query, 0.5, BandwidthPolicy::Warn).unwrap();
        assert_eq!(report.bandwidth, 0.5);
        assert_eq!(
            report.advisories,
            vec![
                Advisory::InsufficientBandwidth {
                    requested: 0.5,
                    min_viable: 6.0,
                    query_indices: vec![0, 1, 3]
                }
            ]
        );

        let fixed = validate_bandwidth(&source, &query, 0.5, BandwidthPolicy::AutoFix).unwrap();
        assert_eq!(fixed.bandwidth, 6.0);
        let validator = BandwidthValidator::new(&source).unwrap();
        assert!(validator.check(&query, fixed.bandwidth, DistanceMetric::Euclidean).is_sufficient());
    }

    #[test]
    fn unit_grid_smaller_bandwidth()
    {
        let source = grid(4, 1.0);
        let validator = BandwidthValidator::new(&source).unwrap();
        assert_eq!(validator.len(), 16);
        let check = validator.check(&source, 0.9, DistanceMetric::Euclidean);
        assert_eq!(check.isolated, (0..16).collect::<Vec<_>>());
        assert_eq!(check.min_viable, Some(1.0));

        let wide = grid(3, 2.5);
        let check = BandwidthValidator::new(&wide)
            .unwrap()
            .check(&wide, 1.0, DistanceMetric::Euclidean);
        assert_eq!(check.min_viable, Some(3.0));
    }

    #[test]
    fn neighbor_counts()
    {
        let validator = BandwidthValidator::new(&SQUARE).unwrap();
        let origin = [0.0, 0.0];
        assert_eq!(validator.neighbor_count(&origin, 0.5, DistanceMetric::Euclidean), 0);
        assert_eq!(validator.neighbor_count(&origin, 1.0, DistanceMetric::Euclidean), 2);
        assert_eq!(validator.neighbor_count(&origin, 1.0, DistanceMetric::Chebyshev), 3);
        assert_eq!(validator.neighbor_count(&origin, 1.5, DistanceMetric::Manhattan), 2);
        assert_eq!(validator.neighbor_count(&origin, 2.0, DistanceMetric::SqEuclidean), 3);
        assert_eq!(validator.neighbor_count(&[0.5, 0.5], 0.8, DistanceMetric::Euclidean), 4);

        assert_eq!(validator.nearest_distance(&origin, DistanceMetric::Euclidean), Some(1.0));
        assert_eq!(validator.nearest_distance(&[3.0, 1.0], DistanceMetric::Manhattan), Some(2.0));

        let lonely = BandwidthValidator::new(&[[2.0, 2.0]]).unwrap();
        assert_eq!(lonely.nearest_distance(&[2.0, 2.0], DistanceMetric::Euclidean), None);
        assert!(lonely.check(&[[2.0, 2.0]], 0.1, DistanceMetric::Euclidean).is_sufficient());
    }

    #[test]
    fn invalid_inputs()
    {
        assert_eq!(
            validate_bandwidth(&[], &SQUARE, 1.0, BandwidthPolicy::Strict),
            Err(GeoBootstrapErrors::EmptySource)
        );
        for bw in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_bandwidth(&SQUARE, &SQUARE, bw, BandwidthPolicy::AutoFix),
                Err(GeoBootstrapErrors::InvalidBandwidth(_))
            ));
        }
        let empty_query = validate_bandwidth(&SQUARE, &[], 0.1, BandwidthPolicy::Strict).unwrap();
        assert_eq!(empty_query.bandwidth, 0.1);
    }
}
