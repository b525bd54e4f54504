// src/processors/spike_analytics/kernel_density.rs

use ndarray::{Array1, ArrayView1};
use num_traits::{Float, FloatConst};

use crate::error::{IntensityError, Result};

/// Gaussian probability density with zero mean
///
/// Args:
///     x: Offset from the kernel center
///     sigma: Standard deviation (must be > 0, checked by callers)
#[inline]
pub fn gaussian_pdf<T: Float + FloatConst>(x: T, sigma: T) -> T {
    let two = T::one() + T::one();
    let z = x / sigma;
    (-(z * z) / two).exp() / (sigma * (two * T::PI()).sqrt())
}

/// Sum of Gaussian kernels centred on `samples`, evaluated at every position bin
///
/// The output axis is always the position-bin axis; the samples are the
/// summed-over axis. One accumulator per position bin, so the two axes can
/// never be mixed up.
///
/// Args:
///     position_bins: Position bin centers (output domain)
///     samples: Positions to place kernels on (occupied or spiking time bins)
///     bandwidth: Kernel standard deviation
///
/// Returns:
///     Kernel density, one value per position bin
pub fn kernel_density<T, I>(position_bins: ArrayView1<'_, T>, samples: I, bandwidth: T) -> Array1<T>
where
    T: Float + FloatConst,
    I: IntoIterator<Item = T>,
{
    let mut density = Array1::<T>::zeros(position_bins.len());

    for sample in samples {
        for (acc, &center) in density.iter_mut().zip(position_bins.iter()) {
            *acc = *acc + gaussian_pdf(center - sample, bandwidth);
        }
    }

    density
}

/// Convert position bin edges into bin centers (midpoints)
///
/// Args:
///     edges: Strictly increasing bin edges, at least two
///
/// Returns:
///     Bin centers, one fewer than the number of edges
pub fn bin_centers_from_edges<T: Float>(edges: ArrayView1<'_, T>) -> Result<Array1<T>> {
    if edges.len() < 2 {
        return Err(IntensityError::InvalidArgument(format!(
            "need at least two bin edges, got {}",
            edges.len()
        )));
    }

    let two = T::one() + T::one();
    let mut centers = Array1::<T>::zeros(edges.len() - 1);
    for (i, center) in centers.iter_mut().enumerate() {
        let (lo, hi) = (edges[i], edges[i + 1]);
        if !(lo.is_finite() && hi.is_finite() && hi > lo) {
            return Err(IntensityError::InvalidArgument(format!(
                "bin edges must be finite and strictly increasing (edge {i})"
            )));
        }
        *center = lo + (hi - lo) / two;
    }

    Ok(centers)
}
