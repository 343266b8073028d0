//! # Geographically weighted bootstrap
//! For every query location: distances to all source points, kernel weights,
//! then a weighted resample with replacement of the source rows.
//!
//! Every call is self contained. Query points are processed in index order and
//! the result always holds one resample per query point; any failure aborts the
//! whole call.
use std::borrow::Cow;

use average::{Estimate, MeanWithError};
use rand::{distr::{Distribution, weighted::WeightedIndex}, Rng};

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

use crate::*;
use crate::bandwidth::check_bandwidth_value;
use crate::sampling::weighted_index;

/// # Configuration of a geographically weighted bootstrap
/// * the defaults are a gaussian kernel, euclidean distances, a fixed bandwidth of 1000
///   and resamples as large as the source collection, without bandwidth validation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct GeoBootstrapConfig {
    /// kernel turning normalized distances into weights
    pub kernel: Kernel,
    /// metric for distances between query and source points
    pub metric: DistanceMetric,
    /// kernel bandwidth, in the units of the coordinates
    pub bandwidth: f64,
    /// only [`BandwidthMode::Fixed`] is supported
    pub mode: BandwidthMode,
    /// number of rows drawn per query point
    pub resample_size: ResampleSize,
    /// validate the bandwidth before resampling, `None` skips validation
    pub bandwidth_policy: Option<BandwidthPolicy>,
}

impl Default for GeoBootstrapConfig {
    fn default() -> Self {
        Self{
            kernel: Kernel::Gaussian,
            metric: DistanceMetric::Euclidean,
            bandwidth: 1000.0,
            mode: BandwidthMode::Fixed,
            resample_size: ResampleSize::default(),
            bandwidth_policy: None,
        }
    }
}

impl GeoBootstrapConfig {
    /// # Default configuration with kernel and metric given by name
    /// * e.g. `from_names("gaussian", "euclidean")`
    pub fn from_names(kernel: &str, metric: &str) -> Result<Self, GeoBootstrapErrors>
    {
        Ok(
            Self{
                kernel: kernel.parse()?,
                metric: metric.parse()?,
                ..Self::default()
            }
        )
    }

    /// set the kernel
    pub fn with_kernel(mut self, kernel: Kernel) -> Self
    {
        self.kernel = kernel;
        self
    }

    /// set the distance metric
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self
    {
        self.metric = metric;
        self
    }

    /// set the bandwidth
    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self
    {
        self.bandwidth = bandwidth;
        self
    }

    /// set the bandwidth mode
    pub fn with_mode(mut self, mode: BandwidthMode) -> Self
    {
        self.mode = mode;
        self
    }

    /// set the size of every resample
    pub fn with_resample_size(mut self, resample_size: ResampleSize) -> Self
    {
        self.resample_size = resample_size;
        self
    }

    /// shorthand for `with_resample_size(ResampleSize::Count(count))`
    pub fn with_resample_count(self, count: usize) -> Self
    {
        self.with_resample_size(ResampleSize::Count(count))
    }

    /// validate the bandwidth with `policy` before resampling
    pub fn with_bandwidth_policy(mut self, policy: BandwidthPolicy) -> Self
    {
        self.bandwidth_policy = Some(policy);
        self
    }
}

/// # Resamples, one per query point
/// * `resamples()[i]` belongs to query point `i`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct GeoBootstrapped<T> {
    pub(crate) resamples: Vec<Vec<T>>,
    pub(crate) bandwidth: f64,
    pub(crate) advisories: Vec<Advisory>,
}

impl<T> GeoBootstrapped<T> {
    /// resamples in query order
    pub fn resamples(&self) -> &[Vec<T>]
    {
        &self.resamples
    }

    /// bandwidth that was used, possibly raised by bandwidth validation
    pub fn bandwidth(&self) -> f64
    {
        self.bandwidth
    }

    /// advisories emitted during the call, in order
    pub fn advisories(&self) -> &[Advisory]
    {
        &self.advisories
    }

    /// number of query points
    pub fn len(&self) -> usize
    {
        self.resamples.len()
    }

    /// true if there were no query points
    pub fn is_empty(&self) -> bool
    {
        self.resamples.is_empty()
    }

    /// iterate over the resamples in query order
    pub fn iter(&self) -> std::slice::Iter<'_, Vec<T>>
    {
        self.resamples.iter()
    }

    /// take the resamples
    pub fn into_resamples(self) -> Vec<Vec<T>>
    {
        self.resamples
    }

    /// apply `f` to every drawn item
    pub fn map<U, F>(self, mut f: F) -> GeoBootstrapped<U>
    where F: FnMut(T) -> U
    {
        GeoBootstrapped{
            resamples: self.resamples
                .into_iter()
                .map(|resample| resample.into_iter().map(&mut f).collect())
                .collect(),
            bandwidth: self.bandwidth,
            advisories: self.advisories,
        }
    }
}

impl GeoBootstrapped<f64> {
    /// # Mean and error of every resample
    /// * index aligned with the query points
    pub fn local_statistics(&self) -> Vec<MeanWithError>
    {
        self.resamples
            .iter()
            .map(|resample| {
                let mut estimate = MeanWithError::new();
                resample.iter().for_each(|&val| estimate.add(val));
                estimate
            }).collect()
    }
}

impl<'a, T> IntoIterator for &'a GeoBootstrapped<T> {
    type Item = &'a Vec<T>;
    type IntoIter = std::slice::Iter<'a, Vec<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Resolved coordinates, bandwidth and kernel of one call
pub(crate) struct GeoBootstrapPlan<'a> {
    source_coords: Cow<'a, [Coord2]>,
    query_coords: Cow<'a, [Coord2]>,
    kernel: Kernel,
    metric: DistanceMetric,
    mode: BandwidthMode,
    pub(crate) bandwidth: f64,
    pub(crate) resample_len: usize,
    pub(crate) advisories: Vec<Advisory>,
}

impl<'a> GeoBootstrapPlan<'a> {
    pub(crate) fn new<R>(
        rng: &mut R,
        source_len: usize,
        source_locations: Locations<'a>,
        query_locations: Locations<'a>,
        config: &GeoBootstrapConfig
    ) -> Result<Self, GeoBootstrapErrors>
    where R: Rng + ?Sized
    {
        let source_coords = source_locations.resolve(rng)?;
        let query_coords = query_locations.resolve(rng)?;

        if source_coords.len() != source_len {
            return Err(
                GeoBootstrapErrors::LengthMismatch {
                    rows: source_len,
                    coordinates: source_coords.len()
                }
            );
        }
        if source_len == 0 {
            return Err(GeoBootstrapErrors::EmptySource);
        }
        check_bandwidth_value(config.bandwidth)?;
        if config.mode != BandwidthMode::Fixed {
            return Err(KernelErrors::UnsupportedMode.into());
        }

        let mut advisories: Vec<Advisory> = config.kernel
            .advisory()
            .into_iter()
            .collect();

        let bandwidth = match config.bandwidth_policy {
            None => config.bandwidth,
            Some(policy) => {
                let report = BandwidthValidator::new(&source_coords)?
                    .validate(&query_coords, config.bandwidth, config.metric, policy)?;
                advisories.extend(report.advisories);
                report.bandwidth
            }
        };

        log::debug!(
            "geobootstrap: {} query points, {} source points, kernel {}, metric {}, bandwidth {}",
            query_coords.len(),
            source_len,
            config.kernel,
            config.metric,
            bandwidth
        );

        Ok(
            Self{
                source_coords,
                query_coords,
                kernel: config.kernel,
                metric: config.metric,
                mode: config.mode,
                bandwidth,
                resample_len: config.resample_size.resolve(source_len),
                advisories,
            }
        )
    }

    pub(crate) fn query_count(&self) -> usize
    {
        self.query_coords.len()
    }

    /// kernel weights of every source point for query point `query_index`
    pub(crate) fn weights(&self, query_index: usize) -> Result<Vec<f64>, GeoBootstrapErrors>
    {
        let distances = self.metric
            .distances_from(&self.query_coords[query_index], &self.source_coords);
        Ok(kernel_weights(self.kernel, &distances, self.bandwidth, self.mode)?)
    }

    /// distribution over the source rows for query point `query_index`
    pub(crate) fn sampler(&self, query_index: usize) -> Result<WeightedIndex<f64>, GeoBootstrapErrors>
    {
        let weights = self.weights(query_index)?;
        weighted_index(&weights)
            .map_err(|_| GeoBootstrapErrors::DegenerateWeights { query_index })
    }

    pub(crate) fn finish<T>(self, resamples: Vec<Vec<T>>) -> GeoBootstrapped<T>
    {
        GeoBootstrapped{
            resamples,
            bandwidth: self.bandwidth,
            advisories: self.advisories,
        }
    }
}

/// # Geographically weighted bootstrap of row indices
/// * `source_len`: number of rows of the source collection,
///   `source_locations` has to describe exactly that many rows
/// * for query point `i` the resample contains indices into the source collection,
///   drawn with probability proportional to the kernel weight of their distance to `i`
/// * validates the bandwidth first if `config.bandwidth_policy` is set
/// * the result has one resample per query point, each of the length given by
///   `config.resample_size`
pub fn geobootstrap_indices<'a, R>(
    mut rng: R,
    source_len: usize,
    source_locations: Locations<'a>,
    query_locations: Locations<'a>,
    config: &GeoBootstrapConfig
) -> Result<GeoBootstrapped<usize>, GeoBootstrapErrors>
where R: Rng
{
    let plan = GeoBootstrapPlan::new(&mut rng, source_len, source_locations, query_locations, config)?;

    let resamples = (0..plan.query_count())
        .map(|query_index| {
            let sampler = plan.sampler(query_index)?;
            Ok(
                (0..plan.resample_len)
                    .map(|_| sampler.sample(&mut rng))
                    .collect()
            )
        }).collect::<Result<Vec<Vec<usize>>, GeoBootstrapErrors>>()?;

    Ok(plan.finish(resamples))
}

/// # Geographically weighted bootstrap of rows
/// * like [`geobootstrap_indices`], but returns references to the drawn rows of `source`
pub fn geobootstrap<'s, 'a, R, S>(
    rng: R,
    source: &'s [S],
    source_locations: Locations<'a>,
    query_locations: Locations<'a>,
    config: &GeoBootstrapConfig
) -> Result<GeoBootstrapped<&'s S>, GeoBootstrapErrors>
where R: Rng
{
    geobootstrap_indices(rng, source.len(), source_locations, query_locations, config)
        .map(|indices| indices.map(|i| &source[i]))
}

/// # Geographically weighted bootstrap of a single attribute
/// * like [`geobootstrap`], but every drawn row is projected with `attribute`,
///   e.g. `|row| row.population_density`
pub fn geobootstrap_attribute<'a, R, S, V, F>(
    rng: R,
    source: &[S],
    source_locations: Locations<'a>,
    query_locations: Locations<'a>,
    config: &GeoBootstrapConfig,
    mut attribute: F
) -> Result<GeoBootstrapped<V>, GeoBootstrapErrors>
where R: Rng,
    F: FnMut(&S) -> V
{
    geobootstrap_indices(rng, source.len(), source_locations, query_locations, config)
        .map(|indices| indices.map(|i| attribute(&source[i])))
}
