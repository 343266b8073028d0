//! # Distance metrics between coordinate sets
//! * distances are computed fresh for every call, nothing is cached
use std::{fmt, str::FromStr};

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

use crate::Coord2;

/// Possible errors while choosing a distance metric
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum DistanceErrors {
    /// The metric name is not known
    UnknownMetric(String),
    /// Minkowski distances need a finite `p >= 1`
    InvalidMinkowskiP(f64),
}

impl fmt::Display for DistanceErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceErrors::UnknownMetric(name) => write!(
                f,
                "unknown distance metric `{name}`, expected one of \
                euclidean, sqeuclidean, cityblock, manhattan, chebyshev, minkowski[:p]"
            ),
            DistanceErrors::InvalidMinkowskiP(p) => write!(
                f,
                "minkowski distance needs a finite p >= 1, got {p}"
            ),
        }
    }
}

impl std::error::Error for DistanceErrors {}

/// # Metric used to measure how far a source point is from a query point
/// * the caller is responsible for a planar, distance preserving projection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum DistanceMetric {
    /// `√(Δx² + Δy²)`
    #[default]
    Euclidean,
    /// `Δx² + Δy²`
    SqEuclidean,
    /// `|Δx| + |Δy|`, also called cityblock
    Manhattan,
    /// `max(|Δx|, |Δy|)`
    Chebyshev,
    /// `(|Δx|^p + |Δy|^p)^(1/p)`, construct with [`DistanceMetric::minkowski`]
    Minkowski(f64),
}

impl DistanceMetric {
    /// # Minkowski metric
    /// * `Err` unless `p` is finite and at least 1
    pub fn minkowski(p: f64) -> Result<Self, DistanceErrors>
    {
        if p.is_finite() && p >= 1.0 {
            Ok(DistanceMetric::Minkowski(p))
        } else {
            Err(DistanceErrors::InvalidMinkowskiP(p))
        }
    }

    /// distance between `a` and `b`
    #[inline]
    pub fn distance(&self, a: &Coord2, b: &Coord2) -> f64
    {
        let dx = (a[0] - b[0]).abs();
        let dy = (a[1] - b[1]).abs();
        match self {
            DistanceMetric::Euclidean => (dx * dx + dy * dy).sqrt(),
            DistanceMetric::SqEuclidean => dx * dx + dy * dy,
            DistanceMetric::Manhattan => dx + dy,
            DistanceMetric::Chebyshev => dx.max(dy),
            DistanceMetric::Minkowski(p) => (dx.powf(*p) + dy.powf(*p)).powf(p.recip()),
        }
    }

    /// # Distance vector
    /// * distances from `query` to every point of `set`, index aligned with `set`
    pub fn distances_from(&self, query: &Coord2, set: &[Coord2]) -> Vec<f64>
    {
        set.iter()
            .map(|point| self.distance(query, point))
            .collect()
    }

    /// # Distance matrix
    /// * `result[i][j]` is the distance from `set_a[i]` to `set_b[j]`
    pub fn pairwise_distances(&self, set_a: &[Coord2], set_b: &[Coord2]) -> Vec<Vec<f64>>
    {
        set_a.iter()
            .map(|a| self.distances_from(a, set_b))
            .collect()
    }

    /// # Euclidean radius containing the ball of radius `radius` of this metric
    /// * used to ask a euclidean spatial index for every candidate within `radius`
    pub(crate) fn euclidean_cover(&self, radius: f64) -> f64
    {
        match self {
            DistanceMetric::Euclidean | DistanceMetric::Manhattan => radius,
            DistanceMetric::SqEuclidean => radius.sqrt(),
            DistanceMetric::Chebyshev => radius * std::f64::consts::SQRT_2,
            DistanceMetric::Minkowski(p) if *p <= 2.0 => radius,
            DistanceMetric::Minkowski(_) => radius * std::f64::consts::SQRT_2,
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Euclidean => f.write_str("euclidean"),
            DistanceMetric::SqEuclidean => f.write_str("sqeuclidean"),
            DistanceMetric::Manhattan => f.write_str("cityblock"),
            DistanceMetric::Chebyshev => f.write_str("chebyshev"),
            DistanceMetric::Minkowski(p) => write!(f, "minkowski:{p}"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = DistanceErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "sqeuclidean" => Ok(DistanceMetric::SqEuclidean),
            "cityblock" | "manhattan" => Ok(DistanceMetric::Manhattan),
            "chebyshev" => Ok(DistanceMetric::Chebyshev),
            "minkowski" => DistanceMetric::minkowski(2.0),
            other => {
                let p = other.strip_prefix("minkowski:")
                    .and_then(|p| p.parse::<f64>().ok())
                    .ok_or_else(|| DistanceErrors::UnknownMetric(other.to_owned()))?;
                DistanceMetric::minkowski(p)
            }
        }
    }
}

/// # Distance matrix between two coordinate sets
/// * parses `metric_name`, see [`DistanceMetric`]
pub fn pairwise_distances(
    set_a: &[Coord2],
    set_b: &[Coord2],
    metric_name: &str
) -> Result<Vec<Vec<f64>>, DistanceErrors>
{
    let metric: DistanceMetric = metric_name.parse()?;
    Ok(metric.pairwise_distances(set_a, set_b))
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn unit_square()
    {
        let square = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let d = pairwise_distances(&[[0.0, 0.0]], &square, "euclidean").unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0], vec![0.0, 1.0, 1.0, 2.0_f64.sqrt()]);

        let d = pairwise_distances(&square, &square, "cityblock").unwrap();
        assert_eq!(d.len(), 4);
        assert_eq!(d[0], vec![0.0, 1.0, 1.0, 2.0]);
        assert_eq!(d[3], vec![2.0, 1.0, 1.0, 0.0]);

        let cheb = DistanceMetric::Chebyshev.distances_from(&[0.0, 0.0], &square);
        assert_eq!(cheb, vec![0.0, 1.0, 1.0, 1.0]);

        let sq = DistanceMetric::SqEuclidean.distances_from(&[0.0, 0.0], &square);
        assert_eq!(sq, vec![0.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn minkowski_matches_special_cases()
    {
        let a = [1.5, -2.0];
        let b = [-3.0, 4.25];
        let m1 = DistanceMetric::minkowski(1.0).unwrap();
        let m2 = DistanceMetric::minkowski(2.0).unwrap();
        assert!((m1.distance(&a, &b) - DistanceMetric::Manhattan.distance(&a, &b)).abs() < 1e-12);
        assert!((m2.distance(&a, &b) - DistanceMetric::Euclidean.distance(&a, &b)).abs() < 1e-12);
    }

    #[test]
    fn parse()
    {
        assert_eq!("manhattan".parse::<DistanceMetric>(), Ok(DistanceMetric::Manhattan));
        assert_eq!("minkowski".parse::<DistanceMetric>(), Ok(DistanceMetric::Minkowski(2.0)));
        assert_eq!("minkowski:3".parse::<DistanceMetric>(), Ok(DistanceMetric::Minkowski(3.0)));
        assert_eq!(
            "minkowski:0.5".parse::<DistanceMetric>(),
            Err(DistanceErrors::InvalidMinkowskiP(0.5))
        );
        assert_eq!(
            "haversine".parse::<DistanceMetric>(),
            Err(DistanceErrors::UnknownMetric("haversine".to_owned()))
        );
        assert!(pairwise_distances(&[], &[], "minkowski:x").is_err());
        for metric in [
            DistanceMetric::Euclidean,
            DistanceMetric::SqEuclidean,
            DistanceMetric::Manhattan,
            DistanceMetric::Chebyshev,
            DistanceMetric::Minkowski(4.0)
        ] {
            assert_eq!(metric.to_string().parse::<DistanceMetric>(), Ok(metric));
        }
    }

    #[test]
    fn cover_contains_ball()
    {
        let origin = [0.0, 0.0];
        let probes = [[0.7, 0.7], [1.0, 0.0], [0.3, -0.9], [-0.5, 0.5]];
        for metric in [
            DistanceMetric::Euclidean,
            DistanceMetric::SqEuclidean,
            DistanceMetric::Manhattan,
            DistanceMetric::Chebyshev,
            DistanceMetric::Minkowski(1.5),
            DistanceMetric::Minkowski(5.0)
        ] {
            let cover = metric.euclidean_cover(1.0);
            for probe in probes.iter() {
                if metric.distance(&origin, probe) <= 1.0 {
                    assert!(
                        DistanceMetric::Euclidean.distance(&origin, probe) <= cover,
                        "{metric} {probe:?}"
                    );
                }
            }
        }
    }
}
