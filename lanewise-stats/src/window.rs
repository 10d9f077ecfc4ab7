//! Moving averages and rolling-window statistics.
//!
//! A window of width `w` over `n` elements produces `n − w + 1` outputs,
//! written to the front of `out`; [`ema`] is the exception and produces `n`.
//! `w == 0` or `w > n` is [`StatsError::InvalidWindow`].

use lanewise_kernel::{
    fold_dot, fold_sumsq, offset, reduce_add, reduce_max, reduce_min, FloatElement, KernelError,
    MaybeSimdOps,
};

use crate::{Result, StatsError};

fn window_outputs(out_len: usize, n: usize, window: usize) -> Result<usize> {
    if window == 0 || window > n {
        return Err(StatsError::InvalidWindow { window, len: n });
    }
    let needed = n - window + 1;
    if out_len < needed {
        return Err(KernelError::OutputTooSmall {
            needed,
            available: out_len,
        }
        .into());
    }
    Ok(needed)
}

/// Apply `f` to every window of `window` consecutive elements.
///
/// `out[i] = f(&input[i..i + window])`. Returns the number of outputs.
pub fn rolling_reduce<T, U, F>(out: &mut [U], input: &[T], window: usize, f: F) -> Result<usize>
where
    F: Fn(&[T]) -> U,
{
    let m = window_outputs(out.len(), input.len(), window)?;
    for (o, w) in out[..m].iter_mut().zip(input.windows(window)) {
        *o = f(w);
    }
    Ok(m)
}

/// Rolling sum with an O(1) sliding update.
pub fn rolling_sum<T: FloatElement + MaybeSimdOps>(
    out: &mut [T],
    input: &[T],
    window: usize,
) -> Result<usize> {
    let m = window_outputs(out.len(), input.len(), window)?;
    let mut acc = reduce_add(&input[..window]);
    out[0] = acc;
    for i in 1..m {
        acc = acc - input[i - 1] + input[i + window - 1];
        out[i] = acc;
    }
    Ok(m)
}

/// Rolling mean.
pub fn rolling_mean<T: FloatElement + MaybeSimdOps>(
    out: &mut [T],
    input: &[T],
    window: usize,
) -> Result<usize> {
    let m = rolling_sum(out, input, window)?;
    let w = T::from_count(window);
    for o in &mut out[..m] {
        *o = *o / w;
    }
    Ok(m)
}

/// Simple moving average, an alias of [`rolling_mean`].
pub fn sma<T: FloatElement + MaybeSimdOps>(out: &mut [T], input: &[T], window: usize) -> Result<usize> {
    rolling_mean(out, input, window)
}

/// Linearly weighted moving average: weight `j + 1` on the `j`-th element
/// of each window, normalised by `w(w + 1)/2`.
pub fn wma<T: FloatElement + MaybeSimdOps>(out: &mut [T], input: &[T], window: usize) -> Result<usize> {
    let m = window_outputs(out.len(), input.len(), window)?;
    let weights: Vec<T> = (1..=window).map(T::from_count).collect();
    let norm = T::from_count(window * (window + 1) / 2);
    for (o, w) in out[..m].iter_mut().zip(input.windows(window)) {
        *o = fold_dot(w, &weights)? / norm;
    }
    Ok(m)
}

/// Exponential moving average with `alpha = 2 / (window + 1)` and
/// `ema[0] = input[0]`. Writes `input.len()` outputs.
pub fn ema<T: FloatElement>(out: &mut [T], input: &[T], window: usize) -> Result<usize> {
    window_outputs(usize::MAX, input.len(), window)?;
    let n = input.len();
    if out.len() < n {
        return Err(KernelError::OutputTooSmall {
            needed: n,
            available: out.len(),
        }
        .into());
    }
    let alpha = T::from_f64_lossy(2.0 / (window as f64 + 1.0));
    let mut prev = input[0];
    out[0] = prev;
    for (o, &x) in out[1..n].iter_mut().zip(&input[1..]) {
        prev = alpha * x + (T::ONE - alpha) * prev;
        *o = prev;
    }
    Ok(n)
}

/// Rolling minimum.
pub fn rolling_min<T: FloatElement>(out: &mut [T], input: &[T], window: usize) -> Result<usize> {
    rolling_reduce(out, input, window, |w| reduce_min(w).unwrap_or_else(T::nan))
}

/// Rolling maximum.
pub fn rolling_max<T: FloatElement>(out: &mut [T], input: &[T], window: usize) -> Result<usize> {
    rolling_reduce(out, input, window, |w| reduce_max(w).unwrap_or_else(T::nan))
}

/// Rolling `max − min`.
pub fn rolling_range<T: FloatElement>(out: &mut [T], input: &[T], window: usize) -> Result<usize> {
    rolling_reduce(out, input, window, |w| match (reduce_max(w), reduce_min(w)) {
        (Some(hi), Some(lo)) => hi - lo,
        _ => T::nan(),
    })
}

/// Rolling population variance, centred on each window's own mean.
pub fn rolling_variance<T: FloatElement + MaybeSimdOps>(
    out: &mut [T],
    input: &[T],
    window: usize,
) -> Result<usize> {
    let m = window_outputs(out.len(), input.len(), window)?;
    let w = T::from_count(window);
    let mut dev = vec![T::ZERO; window];
    for (o, xs) in out[..m].iter_mut().zip(input.windows(window)) {
        let mean = reduce_add(xs) / w;
        offset(&mut dev, xs, -mean)?;
        *o = fold_sumsq(&dev) / w;
    }
    Ok(m)
}

/// Rolling population standard deviation.
pub fn rolling_std<T: FloatElement + MaybeSimdOps>(
    out: &mut [T],
    input: &[T],
    window: usize,
) -> Result<usize> {
    let m = rolling_variance(out, input, window)?;
    for o in &mut out[..m] {
        *o = o.sqrt();
    }
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SERIES: [f64; 6] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

    #[test]
    fn test_sma_and_rolling_sum() {
        let mut out = [0.0; 6];
        assert_eq!(sma(&mut out, &SERIES, 3).unwrap(), 4);
        assert_eq!(&out[..4], &[2.0, 3.0, 4.0, 5.0]);

        assert_eq!(rolling_sum(&mut out, &SERIES, 6).unwrap(), 1);
        assert_eq!(out[0], 21.0);
        assert_eq!(rolling_sum(&mut out, &SERIES, 1).unwrap(), 6);
        assert_eq!(out, SERIES);
    }

    #[test]
    fn test_wma() {
        let mut out = [0.0; 4];
        assert_eq!(wma(&mut out, &SERIES, 3).unwrap(), 4);
        // (1·1 + 2·2 + 3·3) / 6
        assert_relative_eq!(out[0], 14.0 / 6.0);
        assert_relative_eq!(out[3], (4.0 + 10.0 + 18.0) / 6.0);
    }

    #[test]
    fn test_ema() {
        let mut out = [0.0; 6];
        assert_eq!(ema(&mut out, &SERIES, 3).unwrap(), 6);
        assert_eq!(out[0], 1.0);
        assert_relative_eq!(out[1], 1.5);
        assert_relative_eq!(out[2], 2.25);
        assert!(ema(&mut out[..2], &SERIES, 3).is_err());
    }

    #[test]
    fn test_rolling_extrema_and_spread() {
        let data = [3.0f32, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0];
        let mut out = [0.0f32; 7];
        let m = rolling_min(&mut out, &data, 3).unwrap();
        assert_eq!(&out[..m], &[1.0, 1.0, 1.0, 1.0, 2.0]);
        let m = rolling_max(&mut out, &data, 3).unwrap();
        assert_eq!(&out[..m], &[4.0, 4.0, 5.0, 9.0, 9.0]);
        let m = rolling_range(&mut out, &data, 3).unwrap();
        assert_eq!(&out[..m], &[3.0, 3.0, 4.0, 8.0, 7.0]);

        let mut var = [0.0; 4];
        rolling_variance(&mut var, &SERIES, 3).unwrap();
        for v in var {
            assert_relative_eq!(v, 2.0 / 3.0, epsilon = 1e-12);
        }
        rolling_std(&mut var, &SERIES, 3).unwrap();
        assert_relative_eq!(var[0], (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_rolling_variance_large_offset() {
        let data: Vec<f64> = (0..40).map(|i| 1e9 + (i % 4) as f64).collect();
        let mut out = vec![0.0; 40];
        let m = rolling_variance(&mut out, &data, 4).unwrap();
        assert_eq!(m, 37);
        for v in &out[..m] {
            assert_relative_eq!(*v, 1.25, epsilon = 1e-9);
        }
        assert!(rolling_variance(&mut out[..3], &data, 4).is_err());
    }

    #[test]
    fn test_rolling_reduce_custom() {
        let mut out = [0usize; 5];
        let m = rolling_reduce(&mut out, &SERIES, 2, |w| w.iter().filter(|&&x| x > 2.5).count())
            .unwrap();
        assert_eq!(&out[..m], &[0, 1, 2, 2, 2]);
    }

    #[test]
    fn test_invalid_windows() {
        let mut out = [0.0; 6];
        assert_eq!(
            sma(&mut out, &SERIES, 0),
            Err(StatsError::InvalidWindow { window: 0, len: 6 })
        );
        assert!(sma(&mut out, &SERIES, 7).is_err());
        assert!(ema(&mut out, &[], 1).is_err());
        assert!(matches!(
            sma(&mut out[..2], &SERIES, 3),
            Err(StatsError::Kernel(KernelError::OutputTooSmall { .. }))
        ));
    }
}
