//! Bootstrap estimates of local statistics
use average::{Estimate, MeanWithError};
use rand::{distr::{Distribution, weighted::WeightedIndex}, Rng};

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

use crate::*;
use crate::geobootstrap::GeoBootstrapPlan;
use crate::sampling::weighted_index;

fn bootstrap_with<F, R>(
    rng: &mut R,
    samples: usize,
    data: &[f64],
    dist: &WeightedIndex<f64>,
    resample_len: usize,
    mut reduction: F
) -> (f64, f64)
where F: FnMut(&mut [f64]) -> f64,
    R: Rng + ?Sized
{
    let mut bootstrap_sample = Vec::with_capacity(resample_len);
    let mut estimate = MeanWithError::new();

    (0..samples).for_each(|_| {
        bootstrap_sample.clear();
        bootstrap_sample.extend((0..resample_len).map(|_| data[dist.sample(rng)]));
        estimate.add(reduction(&mut bootstrap_sample));
    });

    (estimate.mean(), estimate.population_variance())
}

/// # Weighted bootstrap
/// * draws `samples` resamples of `data`, each as long as `data`,
///   picking `data[i]` with probability proportional to `weights[i]`
/// * returns mean and variance of the reduced values (estimated error is sqrt of variance)
/// * with equal weights this is the classic bootstrap
/// * the reduction may reorder the resample, e.g. to compute a median
pub fn weighted_bootstrap<F, R>(
    mut rng: R,
    samples: usize,
    data: &[f64],
    weights: &[f64],
    reduction: F
) -> Result<(f64, f64), SamplingErrors>
where F: FnMut(&mut [f64]) -> f64,
    R: Rng
{
    if data.len() != weights.len() {
        return Err(
            SamplingErrors::LengthMismatch { population: data.len(), weights: weights.len() }
        );
    }
    let dist = weighted_index(weights)?;
    Ok(bootstrap_with(&mut rng, samples, data, &dist, data.len(), reduction))
}

/// Result of [`local_bootstrap`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct LocalBootstrap {
    /// mean and variance of the reduced statistic, one entry per query point
    pub estimates: Vec<(f64, f64)>,
    /// bandwidth that was used, possibly raised by bandwidth validation
    pub bandwidth: f64,
    /// advisories emitted during the call
    pub advisories: Vec<Advisory>,
}

/// # Geographically weighted bootstrap estimate of a local statistic
/// * `values[i]` is the attribute of source row `i`
/// * for every query point, draws `samples` kernel weighted resamples
///   (sized by `config.resample_size`) and reduces each of them with `reduction`
/// * `estimates[i]` is mean and variance of the reduced values of query point `i`
pub fn local_bootstrap<'a, F, R>(
    mut rng: R,
    samples: usize,
    values: &[f64],
    source_locations: Locations<'a>,
    query_locations: Locations<'a>,
    config: &GeoBootstrapConfig,
    mut reduction: F
) -> Result<LocalBootstrap, GeoBootstrapErrors>
where F: FnMut(&mut [f64]) -> f64,
    R: Rng
{
    let plan = GeoBootstrapPlan::new(&mut rng, values.len(), source_locations, query_locations, config)?;

    let estimates = (0..plan.query_count())
        .map(|query_index| {
            let dist = plan.sampler(query_index)?;
            Ok(bootstrap_with(&mut rng, samples, values, &dist, plan.resample_len, &mut reduction))
        }).collect::<Result<Vec<_>, GeoBootstrapErrors>>()?;

    Ok(
        LocalBootstrap{
            estimates,
            bandwidth: plan.bandwidth,
            advisories: plan.advisories,
        }
    )
}

/// arithmetic mean, NaN for an empty slice
pub fn mean(values: &mut [f64]) -> f64
{
    values.iter().sum::<f64>() / values.len() as f64
}

/// # median
/// * sorts `values`, NaN for an empty slice
pub fn median(values: &mut [f64]) -> f64
{
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        0.5 * (values[mid - 1] + values[mid])
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn equal_weights_match_classic_bootstrap()
    {
        let rng = Pcg64Mcg::seed_from_u64(2314668);
        let data: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let weights = vec![1.0; data.len()];
        let (m, var) = weighted_bootstrap(rng, 2000, &data, &weights, mean).unwrap();
        // mean of 0..200 is 99.5, standard error of the mean is ~4.06
        assert!((m - 99.5).abs() < 1.0, "{m}");
        assert!((var.sqrt() - 4.06).abs() < 0.5, "{var}");
    }

    #[test]
    fn single_weight_has_no_variance()
    {
        let rng = Pcg64Mcg::seed_from_u64(1);
        let (m, var) = weighted_bootstrap(rng, 50, &[1.0, 2.0, 3.0], &[0.0, 5.0, 0.0], median)
            .unwrap();
        assert_eq!(m, 2.0);
        assert_eq!(var, 0.0);

        let rng = Pcg64Mcg::seed_from_u64(1);
        assert_eq!(
            weighted_bootstrap(rng, 50, &[1.0, 2.0], &[0.0, 5.0, 0.0], median),
            Err(SamplingErrors::LengthMismatch { population: 2, weights: 3 })
        );
    }

    #[test]
    fn local_estimates()
    {
        // two clusters far apart with different values
        let mut coords = Vec::new();
        let mut values = Vec::new();
        for i in 0..10 {
            coords.push([i as f64 * 0.1, 0.0]);
            values.push(1.0);
            coords.push([100.0 + i as f64 * 0.1, 0.0]);
            values.push(5.0);
        }
        let query = [[0.5, 0.0], [100.5, 0.0]];
        let config = GeoBootstrapConfig::default()
            .with_bandwidth(1.0)
            .with_resample_count(10);

        let result = local_bootstrap(
            Pcg64Mcg::seed_from_u64(94375982592),
            100,
            &values,
            Locations::Coordinates(&coords),
            Locations::Coordinates(&query),
            &config,
            mean
        ).unwrap();
        assert_eq!(result.estimates.len(), 2);
        assert_eq!(result.bandwidth, 1.0);
        assert!((result.estimates[0].0 - 1.0).abs() < 1e-12);
        assert!((result.estimates[1].0 - 5.0).abs() < 1e-12);
        assert!(result.estimates.iter().all(|&(_, var)| var.abs() < 1e-12));
        assert!(result.advisories.is_empty());
    }

    #[test]
    fn helpers()
    {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), 2.5);
        assert!(median(&mut []).is_nan());
        assert_eq!(mean(&mut [1.0, 2.0, 6.0]), 3.0);
    }
}
