//! Statistics over flat float buffers, composed from `lanewise-kernel`
//! maps, reductions and sorting.
//!
//! - [`descriptive`]: mean, then variance, skewness and kurtosis from the
//!   centred deviations
//! - [`moments`]: raw power sums in one set of reductions
//! - [`percentile`], [`percentiles`], [`quartiles`]
//! - [`covariance`], [`correlation`], [`linear_regression`]
//! - [`outliers_zscore`], [`outliers_iqr`]
//! - moving averages and rolling windows in [`window`]
//!
//! All estimators are population estimators (divide by `n`).

mod stats;
pub mod window;

pub use stats::{
    correlation, covariance, descriptive, linear_regression, moments, outliers_iqr,
    outliers_zscore, percentile, percentiles, quartiles, DescriptiveStats, LinearRegression,
    Quartiles,
};
pub use window::{
    ema, rolling_max, rolling_mean, rolling_min, rolling_range, rolling_reduce, rolling_std,
    rolling_sum, rolling_variance, sma, wma,
};

use lanewise_kernel::KernelError;

/// Errors from the statistics layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// A window of `window` elements does not fit a series of `len`.
    #[error("invalid window {window} for series of length {len}")]
    InvalidWindow { window: usize, len: usize },

    /// Percentile rank outside `[0, 1]`.
    #[error("percentile {0} outside [0, 1]")]
    InvalidPercentile(f64),
}

/// Result type for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;
