//! # Kernel functions
//! Map a normalized distance `z = distance / bandwidth` to a weight.
//!
//! | kernel      | weight                |
//! |-------------|-----------------------|
//! | triangular  | `1 - z`               |
//! | uniform     | `0.5`                 |
//! | quadratic   | `3/4 (1 - z²)`        |
//! | quartic     | `15/16 (1 - z²)²`     |
//! | gaussian    | `exp(-z²/2)`          |
//! | bisquare    | `(1 - z²)²`           |
//! | exponential | `exp(-z)`             |
//!
//! The polynomial kernels are not clipped: beyond the bandwidth `triangular`
//! and `quadratic` become negative, see [`sample_indices_with_replacement`](crate::sample_indices_with_replacement)
//! for how those weights are treated while sampling.
use std::{fmt, str::FromStr};
use num_traits::Float;

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

use crate::Advisory;

/// Kernel names in the order they are reported
pub const SUPPORTED_KERNELS: [&str; 7] = [
    "triangular",
    "uniform",
    "quadratic",
    "quartic",
    "gaussian",
    "bisquare",
    "exponential",
];

/// Possible errors of the kernel library
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum KernelErrors {
    /// The kernel name is not one of [`SUPPORTED_KERNELS`]
    UnsupportedKernel(String),
    /// Only fixed bandwidths are currently supported
    UnsupportedMode,
}

impl fmt::Display for KernelErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelErrors::UnsupportedKernel(name) => write!(
                f,
                "unsupported kernel function `{name}`, expected one of {SUPPORTED_KERNELS:?}"
            ),
            KernelErrors::UnsupportedMode => write!(f, "only fixed bandwidths are currently supported"),
        }
    }
}

impl std::error::Error for KernelErrors {}

/// # Kernel function family
/// * use [`Kernel::from_str`] to parse one of the [`SUPPORTED_KERNELS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "lowercase"))]
pub enum Kernel {
    /// `1 - z`
    Triangular,
    /// `0.5` for any `z`
    Uniform,
    /// `3/4 (1 - z²)`
    Quadratic,
    /// `15/16 (1 - z²)²`
    Quartic,
    /// `exp(-z²/2)`
    #[default]
    Gaussian,
    /// `(1 - z²)²`
    Bisquare,
    /// `exp(-z)`
    Exponential,
}

#[inline(always)]
fn constant<T: Float>(val: f64) -> T
{
    T::from(val).unwrap_or_else(T::nan)
}

impl Kernel {
    /// All kernels, in the order of [`SUPPORTED_KERNELS`]
    pub const ALL: [Kernel; 7] = [
        Kernel::Triangular,
        Kernel::Uniform,
        Kernel::Quadratic,
        Kernel::Quartic,
        Kernel::Gaussian,
        Kernel::Bisquare,
        Kernel::Exponential,
    ];

    /// lowercase name of the kernel
    pub fn name(&self) -> &'static str
    {
        match self {
            Kernel::Triangular => "triangular",
            Kernel::Uniform => "uniform",
            Kernel::Quadratic => "quadratic",
            Kernel::Quartic => "quartic",
            Kernel::Gaussian => "gaussian",
            Kernel::Bisquare => "bisquare",
            Kernel::Exponential => "exponential",
        }
    }

    /// # Weight for a single normalized distance `z`
    pub fn weight<T: Float>(&self, z: T) -> T
    {
        let one = T::one();
        match self {
            Kernel::Triangular => one - z,
            Kernel::Uniform => constant(0.5),
            Kernel::Quadratic => constant::<T>(0.75) * (one - z * z),
            Kernel::Quartic => {
                let t = one - z * z;
                constant::<T>(15.0 / 16.0) * t * t
            },
            Kernel::Gaussian => (constant::<T>(-0.5) * z * z).exp(),
            Kernel::Bisquare => {
                let t = one - z * z;
                t * t
            },
            Kernel::Exponential => (-z).exp(),
        }
    }

    /// # Element-wise weights of normalized distances
    /// * the result is index aligned with `zs`
    pub fn weights<T: Float>(&self, zs: &[T]) -> Vec<T>
    {
        zs.iter()
            .map(|&z| self.weight(z))
            .collect()
    }

    /// # Advisory for kernels that were not validated
    /// * `None` for the gaussian kernel
    /// * the returned advisory was already logged
    pub fn advisory(&self) -> Option<Advisory>
    {
        if matches!(self, Kernel::Gaussian) {
            None
        } else {
            Some(Advisory::UnvalidatedKernel(*self).emit())
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = KernelErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kernel::ALL
            .into_iter()
            .find(|kernel| kernel.name() == s)
            .ok_or_else(|| KernelErrors::UnsupportedKernel(s.to_owned()))
    }
}

/// # How the bandwidth is chosen per query point
/// * only [`BandwidthMode::Fixed`] is implemented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum BandwidthMode {
    /// one bandwidth for every query point
    #[default]
    Fixed,
    /// k-nearest-neighbor derived bandwidth per query point
    Adaptive,
}

/// # Weights for a distance vector
/// * divides every distance by `bandwidth` and applies `kernel`
/// * `Err(KernelErrors::UnsupportedMode)` for anything but a fixed bandwidth
pub fn kernel_weights<T: Float>(
    kernel: Kernel,
    distances: &[T],
    bandwidth: T,
    mode: BandwidthMode
) -> Result<Vec<T>, KernelErrors>
{
    match mode {
        BandwidthMode::Fixed => {
            let weights = distances.iter()
                .map(|&d| kernel.weight(d / bandwidth))
                .collect();
            Ok(weights)
        },
        BandwidthMode::Adaptive => Err(KernelErrors::UnsupportedMode)
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    fn assert_close(a: f64, b: f64)
    {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn closed_forms()
    {
        let zs: Vec<f64> = (0..=20).map(|i| i as f64 / 20.0).collect();
        for kernel in Kernel::ALL {
            let weights = kernel.weights(&zs);
            assert_eq!(weights.len(), zs.len());
            for (&z, &w) in zs.iter().zip(weights.iter()) {
                let expected = match kernel {
                    Kernel::Triangular => 1.0 - z,
                    Kernel::Uniform => 0.5,
                    Kernel::Quadratic => 0.75 * (1.0 - z * z),
                    Kernel::Quartic => 15.0 / 16.0 * (1.0 - z * z).powi(2),
                    Kernel::Gaussian => (-0.5 * z * z).exp(),
                    Kernel::Bisquare => (1.0 - z * z).powi(2),
                    Kernel::Exponential => (-z).exp(),
                };
                assert_close(w, expected);
            }
        }
    }

    #[test]
    fn values_at_zero()
    {
        assert_eq!(Kernel::Gaussian.weight(0.0_f64), 1.0);
        assert_eq!(Kernel::Exponential.weight(0.0_f64), 1.0);
        assert_eq!(Kernel::Bisquare.weight(0.0_f64), 1.0);
        assert_eq!(Kernel::Quartic.weight(0.0_f32), 15.0 / 16.0);
        for z in [0.0, 0.3, 1.0, 7.5, 1e6] {
            assert_eq!(Kernel::Uniform.weight(z), 0.5);
        }
    }

    #[test]
    fn beyond_bandwidth_is_not_clipped()
    {
        assert_close(Kernel::Triangular.weight(2.0), -1.0);
        assert_close(Kernel::Quadratic.weight(2.0), -2.25);
        assert!(Kernel::Bisquare.weight(2.0) > 0.0);
    }

    #[test]
    fn parse_names()
    {
        for (name, kernel) in SUPPORTED_KERNELS.iter().zip(Kernel::ALL) {
            assert_eq!(name.parse::<Kernel>().unwrap(), kernel);
            assert_eq!(kernel.to_string(), *name);
        }
        let err = "epanechnikov".parse::<Kernel>().unwrap_err();
        assert_eq!(err, KernelErrors::UnsupportedKernel("epanechnikov".to_owned()));
        let msg = err.to_string();
        assert!(msg.contains("epanechnikov"));
        assert!(msg.contains("gaussian"));
        assert!("Gaussian".parse::<Kernel>().is_err());
    }

    #[test]
    fn advisories()
    {
        assert!(Kernel::Gaussian.advisory().is_none());
        assert_eq!(
            Kernel::Bisquare.advisory(),
            Some(Advisory::UnvalidatedKernel(Kernel::Bisquare))
        );
    }

    #[test]
    fn fixed_and_adaptive()
    {
        let distances = [0.0, 1.0, 1.0, 2.0_f64.sqrt()];
        let weights = kernel_weights(Kernel::Gaussian, &distances, 1.0, BandwidthMode::Fixed)
            .unwrap();
        let expected = [1.0, 0.6065306597126334, 0.6065306597126334, 0.36787944117144233];
        for (w, e) in weights.iter().zip(expected) {
            assert_close(*w, e);
        }

        let halved = kernel_weights(Kernel::Triangular, &[500.0, 1000.0], 1000.0, BandwidthMode::Fixed)
            .unwrap();
        assert_eq!(halved, vec![0.5, 0.0]);

        assert_eq!(
            kernel_weights(Kernel::Gaussian, &distances, 1.0, BandwidthMode::Adaptive),
            Err(KernelErrors::UnsupportedMode)
        );
    }
}
