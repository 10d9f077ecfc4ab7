//! Descriptive statistics, correlation, regression and outlier detection.

use lanewise_kernel::{
    fold_dot, fold_sumsq, map_into, offset, reduce_add, sort_into, FloatElement, KernelError,
    MaybeSimdOps,
};

use crate::{Result, StatsError};

/// Population descriptive statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptiveStats<T> {
    pub mean: T,
    pub variance: T,
    pub std_dev: T,
    /// `m3 / σ³`.
    pub skewness: T,
    /// Excess kurtosis, `m4 / σ⁴ − 3`.
    pub kurtosis: T,
}

/// First, second and third quartiles of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles<T> {
    pub q1: T,
    pub median: T,
    pub q3: T,
    pub iqr: T,
}

/// Ordinary least-squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRegression<T> {
    pub slope: T,
    pub intercept: T,
    pub r_squared: T,
    /// Residual standard error, `sqrt(SSE / (n − 2))`.
    pub std_error: T,
}

impl<T: FloatElement> LinearRegression<T> {
    fn undefined() -> Self {
        Self {
            slope: T::nan(),
            intercept: T::nan(),
            r_squared: T::nan(),
            std_error: T::nan(),
        }
    }

    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: T) -> T {
        self.slope.lane_mul(x).lane_add(self.intercept)
    }
}

fn ensure_same_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(KernelError::LengthMismatch { expected, actual }.into());
    }
    Ok(())
}

#[inline]
fn count<T: FloatElement>(n: usize) -> T {
    T::from_count(n)
}

/// Whether `variance` is no larger than the rounding residue a constant
/// series of `n` values at `mean` can leave behind.
///
/// The computed mean of `n` equal values is off by at most about
/// `n · ε · |mean|`, so every centred deviation, and hence the population
/// variance, is bounded by the square of that.
fn negligible_variance<T: FloatElement>(variance: T, mean: T, n: usize) -> bool {
    let residue = count::<T>(2 * n) * T::epsilon() * mean.abs();
    variance <= residue * residue
}

/// Raw power sums `[Σx, Σx², Σx³, Σx⁴]`.
pub fn moments<T: FloatElement + MaybeSimdOps>(input: &[T]) -> Result<[T; 4]> {
    let mut squares = vec![T::ZERO; input.len()];
    map_into(&mut squares, input, |x: T| x * x)?;
    Ok([
        reduce_add(input),
        fold_sumsq(input),
        fold_dot(&squares, input)?,
        fold_sumsq(&squares),
    ])
}

/// Mean, population variance, standard deviation, skewness and excess
/// kurtosis.
///
/// Moments are taken about the mean, so large offsets do not cancel
/// catastrophically. Empty input yields all-NaN. Constant input yields zero
/// variance, skewness and kurtosis even when the mean itself is inexact
/// (`[0.3; n]`): a variance within the rounding residue of the mean is
/// reported as exactly zero.
pub fn descriptive<T: FloatElement + MaybeSimdOps>(input: &[T]) -> Result<DescriptiveStats<T>> {
    let n = input.len();
    if n == 0 {
        return Ok(DescriptiveStats {
            mean: T::nan(),
            variance: T::nan(),
            std_dev: T::nan(),
            skewness: T::nan(),
            kurtosis: T::nan(),
        });
    }
    let nf = count::<T>(n);
    let mean = reduce_add(input) / nf;

    let mut dev = vec![T::ZERO; n];
    offset(&mut dev, input, -mean)?;
    let mut dev2 = vec![T::ZERO; n];
    map_into(&mut dev2, &dev, |d: T| d * d)?;

    let mut variance = fold_sumsq(&dev) / nf;
    if negligible_variance(variance, mean, n) {
        variance = T::ZERO;
    }
    let std_dev = variance.sqrt();
    let (skewness, kurtosis) = if variance > T::ZERO {
        let m3 = fold_dot(&dev2, &dev)? / nf;
        let m4 = fold_sumsq(&dev2) / nf;
        (
            m3 / (variance * std_dev),
            m4 / (variance * variance) - T::from_f64_lossy(3.0),
        )
    } else {
        (T::ZERO, T::ZERO)
    };
    log::trace!("descriptive: n={} mean={:?} variance={:?}", n, mean, variance);

    Ok(DescriptiveStats {
        mean,
        variance,
        std_dev,
        skewness,
        kurtosis,
    })
}

fn check_rank(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidPercentile(p));
    }
    Ok(())
}

/// Linear interpolation at rank `p · (n − 1)` of an ascending slice.
fn interpolate<T: FloatElement>(sorted: &[T], p: f64) -> T {
    match sorted.len() {
        0 => T::nan(),
        1 => sorted[0],
        n => {
            let rank = p * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = T::from_f64_lossy(rank - lo as f64);
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn sorted_copy<T: FloatElement>(input: &[T]) -> Result<Vec<T>> {
    let mut sorted = vec![T::ZERO; input.len()];
    sort_into(&mut sorted, input)?;
    Ok(sorted)
}

/// The `p`-th percentile, `p ∈ [0, 1]`. Empty input yields NaN.
pub fn percentile<T: FloatElement>(input: &[T], p: f64) -> Result<T> {
    check_rank(p)?;
    Ok(interpolate(&sorted_copy(input)?, p))
}

/// Several percentiles from one sort. `out[i]` receives the `ps[i]`-th
/// percentile.
pub fn percentiles<T: FloatElement>(out: &mut [T], input: &[T], ps: &[f64]) -> Result<()> {
    ensure_same_len(ps.len(), out.len())?;
    ps.iter().try_for_each(|&p| check_rank(p))?;
    let sorted = sorted_copy(input)?;
    for (o, &p) in out.iter_mut().zip(ps) {
        *o = interpolate(&sorted, p);
    }
    Ok(())
}

/// Q1, median, Q3 and the interquartile range.
pub fn quartiles<T: FloatElement>(input: &[T]) -> Result<Quartiles<T>> {
    let sorted = sorted_copy(input)?;
    let q1 = interpolate(&sorted, 0.25);
    let q3 = interpolate(&sorted, 0.75);
    Ok(Quartiles {
        q1,
        median: interpolate(&sorted, 0.5),
        q3,
        iqr: q3 - q1,
    })
}

/// Population covariance `E[XY] − E[X]E[Y]`. Empty input yields NaN.
pub fn covariance<T: FloatElement + MaybeSimdOps>(x: &[T], y: &[T]) -> Result<T> {
    let sxy = fold_dot(x, y)?;
    if x.is_empty() {
        return Ok(T::nan());
    }
    let nf = count::<T>(x.len());
    Ok(sxy / nf - (reduce_add(x) / nf) * (reduce_add(y) / nf))
}

/// Pearson correlation. NaN when `n < 2` or either series is constant.
pub fn correlation<T: FloatElement + MaybeSimdOps>(x: &[T], y: &[T]) -> Result<T> {
    let cov = covariance(x, y)?;
    if x.len() < 2 {
        return Ok(T::nan());
    }
    let vx = descriptive(x)?.variance;
    let vy = descriptive(y)?.variance;
    if vx <= T::ZERO || vy <= T::ZERO {
        return Ok(T::nan());
    }
    Ok(cov / (vx * vy).sqrt())
}

/// Least-squares line through `(x[i], y[i])`.
///
/// Fewer than two points, or constant `x`, gives an all-NaN fit. Constant
/// `y` gives a flat line with `r_squared = 1`.
pub fn linear_regression<T: FloatElement + MaybeSimdOps>(
    x: &[T],
    y: &[T],
) -> Result<LinearRegression<T>> {
    let cov = covariance(x, y)?;
    let n = x.len();
    if n < 2 {
        return Ok(LinearRegression::undefined());
    }
    let sx = descriptive(x)?;
    let sy = descriptive(y)?;
    if sx.variance <= T::ZERO {
        return Ok(LinearRegression::undefined());
    }

    let slope = cov / sx.variance;
    let intercept = sy.mean - slope * sx.mean;
    let r_squared = if sy.variance > T::ZERO {
        let r = cov / (sx.variance * sy.variance).sqrt();
        r * r
    } else {
        T::ONE
    };
    let std_error = if n > 2 {
        // SSE = n · var(y) · (1 − r²)
        let sse = count::<T>(n) * sy.variance * (T::ONE - r_squared);
        (sse.max(T::ZERO) / count::<T>(n - 2)).sqrt()
    } else {
        T::ZERO
    };
    log::debug!("linear_regression: n={} slope={:?} r2={:?}", n, slope, r_squared);

    Ok(LinearRegression {
        slope,
        intercept,
        r_squared,
        std_error,
    })
}

fn mark<T: Copy>(flags: &mut [bool], input: &[T], outlier: impl Fn(T) -> bool) -> usize {
    let mut hits = 0;
    for (f, &x) in flags.iter_mut().zip(input) {
        *f = outlier(x);
        hits += usize::from(*f);
    }
    hits
}

/// Flag elements with `|x − mean| / σ > threshold`. Returns the number
/// flagged.
///
/// Fewer than two elements, or zero spread, flags nothing.
pub fn outliers_zscore<T: FloatElement + MaybeSimdOps>(
    flags: &mut [bool],
    input: &[T],
    threshold: T,
) -> Result<usize> {
    ensure_same_len(input.len(), flags.len())?;
    flags.fill(false);
    if input.len() < 2 {
        return Ok(0);
    }
    let s = descriptive(input)?;
    if s.std_dev <= T::ZERO || !s.std_dev.is_finite() {
        return Ok(0);
    }
    Ok(mark(flags, input, |x| {
        let z = (x - s.mean) / s.std_dev;
        z > threshold || z < -threshold
    }))
}

/// Flag elements outside `[Q1 − k·IQR, Q3 + k·IQR]`. Returns the number
/// flagged.
///
/// Fewer than four elements, or a zero IQR, flags nothing.
pub fn outliers_iqr<T: FloatElement>(flags: &mut [bool], input: &[T], k: T) -> Result<usize> {
    ensure_same_len(input.len(), flags.len())?;
    flags.fill(false);
    if input.len() < 4 {
        return Ok(0);
    }
    let q = quartiles(input)?;
    if q.iqr == T::ZERO {
        return Ok(0);
    }
    let lower = q.q1 - k * q.iqr;
    let upper = q.q3 + k * q.iqr;
    Ok(mark(flags, input, |x| x < lower || x > upper))
}
