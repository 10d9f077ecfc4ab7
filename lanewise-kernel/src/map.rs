//! Element-wise map and zip kernels.
//!
//! Every output lane depends on exactly one input index, so blocks are
//! processed independently: load `K` lanes, apply the operation lane-wise,
//! store `K` lanes. The tail is handled one element at a time.

use lanewise_traits::{Element, FloatElement};

use crate::lanes::{dispatch_lanes, drive, load, store, Step, WithLanes};
use crate::simd::dispatch_if_large;
use crate::{ensure_same_len, Result};

/// Which multiply path a kernel takes for an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulTier {
    /// Lane-parallel multiply.
    Vector,
    /// Element-at-a-time multiply; the ISA has no lane multiply at this width.
    Scalar,
}

/// The multiply tier used by `scale`, `scale_in_place` and `axpy` for `T`.
#[inline]
pub fn mul_tier<T: Element>() -> MulTier {
    if T::NATIVE_MUL {
        MulTier::Vector
    } else {
        MulTier::Scalar
    }
}

// ----------------------------------------------------------------------------
// Kernel bodies
// ----------------------------------------------------------------------------

struct Map<'a, T, U, F> {
    out: &'a mut [U],
    input: &'a [T],
    f: F,
}

impl<T: Copy, U: Copy, F: Fn(T) -> U> WithLanes for Map<'_, T, U, F> {
    type Output = ();

    #[inline(always)]
    fn with_lanes<const K: usize>(self) {
        let Map { out, input, f } = self;
        drive::<K>(input.len(), |step| match step {
            Step::Scalar(j) => out[j] = f(input[j]),
            _ => {
                for s in step.blocks::<K>() {
                    let v: [T; K] = load(input, s);
                    store(out, s, &v.map(&f));
                }
            }
        });
    }
}

struct Zip<'a, A, B, U, F> {
    out: &'a mut [U],
    a: &'a [A],
    b: &'a [B],
    f: F,
}

impl<A: Copy, B: Copy, U: Copy, F: Fn(A, B) -> U> WithLanes for Zip<'_, A, B, U, F> {
    type Output = ();

    #[inline(always)]
    fn with_lanes<const K: usize>(self) {
        let Zip { out, a, b, f } = self;
        drive::<K>(a.len(), |step| match step {
            Step::Scalar(j) => out[j] = f(a[j], b[j]),
            _ => {
                for s in step.blocks::<K>() {
                    let va: [A; K] = load(a, s);
                    let vb: [B; K] = load(b, s);
                    let r: [U; K] = std::array::from_fn(|l| f(va[l], vb[l]));
                    store(out, s, &r);
                }
            }
        });
    }
}

struct MapInPlace<'a, T, F> {
    buf: &'a mut [T],
    f: F,
}

impl<T: Copy, F: Fn(T) -> T> WithLanes for MapInPlace<'_, T, F> {
    type Output = ();

    #[inline(always)]
    fn with_lanes<const K: usize>(self) {
        let MapInPlace { buf, f } = self;
        drive::<K>(buf.len(), |step| match step {
            Step::Scalar(j) => buf[j] = f(buf[j]),
            _ => {
                for s in step.blocks::<K>() {
                    let v: [T; K] = load(buf, s);
                    store(buf, s, &v.map(&f));
                }
            }
        });
    }
}

// ----------------------------------------------------------------------------
// General closures
// ----------------------------------------------------------------------------

/// `out[i] = f(input[i])`.
///
/// The lane width is taken from the input element type.
pub fn map_into<T, U, F>(out: &mut [U], input: &[T], f: F) -> Result<()>
where
    T: Element,
    U: Copy,
    F: Fn(T) -> U,
{
    ensure_same_len(input.len(), out.len())?;
    log::trace!(
        "map_into<{}>: n={} lanes={}",
        std::any::type_name::<T>(),
        input.len(),
        T::LANES
    );
    dispatch_if_large(input.len(), || {
        dispatch_lanes::<T, _>(Map { out, input, f })
    });
    Ok(())
}

/// `out[i] = f(a[i], b[i])`.
pub fn zip_into<A, B, U, F>(out: &mut [U], a: &[A], b: &[B], f: F) -> Result<()>
where
    A: Element,
    B: Copy,
    U: Copy,
    F: Fn(A, B) -> U,
{
    ensure_same_len(a.len(), b.len())?;
    ensure_same_len(a.len(), out.len())?;
    log::trace!(
        "zip_into<{}>: n={} lanes={}",
        std::any::type_name::<A>(),
        a.len(),
        A::LANES
    );
    dispatch_if_large(a.len(), || {
        dispatch_lanes::<A, _>(Zip { out, a, b, f })
    });
    Ok(())
}

fn map_in_place<T: Element, F: Fn(T) -> T>(buf: &mut [T], f: F) {
    let n = buf.len();
    dispatch_if_large(n, || dispatch_lanes::<T, _>(MapInPlace { buf, f }));
}

// ----------------------------------------------------------------------------
// Arithmetic kernels
// ----------------------------------------------------------------------------

/// `out[i] = input[i] * c`.
pub fn scale<T: Element>(out: &mut [T], input: &[T], c: T) -> Result<()> {
    match mul_tier::<T>() {
        MulTier::Vector => map_into(out, input, move |x: T| x.lane_mul(c)),
        MulTier::Scalar => {
            ensure_same_len(input.len(), out.len())?;
            log::debug!("scale<{}>: scalar multiply tier", std::any::type_name::<T>());
            for (o, &x) in out.iter_mut().zip(input) {
                *o = x.lane_mul(c);
            }
            Ok(())
        }
    }
}

/// `buf[i] *= c`. The one aliasing mode the map kernels support.
pub fn scale_in_place<T: Element>(buf: &mut [T], c: T) {
    match mul_tier::<T>() {
        MulTier::Vector => map_in_place(buf, move |x: T| x.lane_mul(c)),
        MulTier::Scalar => {
            log::debug!(
                "scale_in_place<{}>: scalar multiply tier",
                std::any::type_name::<T>()
            );
            for x in buf.iter_mut() {
                *x = x.lane_mul(c);
            }
        }
    }
}

/// `out[i] = input[i] + c`.
pub fn offset<T: Element>(out: &mut [T], input: &[T], c: T) -> Result<()> {
    map_into(out, input, move |x: T| x.lane_add(c))
}

/// `out[i] = c * x[i] + y[i]`.
pub fn axpy<T: Element>(out: &mut [T], x: &[T], y: &[T], c: T) -> Result<()> {
    match mul_tier::<T>() {
        MulTier::Vector => zip_into(out, x, y, move |xi: T, yi: T| c.lane_mul(xi).lane_add(yi)),
        MulTier::Scalar => {
            ensure_same_len(x.len(), y.len())?;
            ensure_same_len(x.len(), out.len())?;
            log::debug!("axpy<{}>: scalar multiply tier", std::any::type_name::<T>());
            for ((o, &xi), &yi) in out.iter_mut().zip(x).zip(y) {
                *o = c.lane_mul(xi).lane_add(yi);
            }
            Ok(())
        }
    }
}

/// `out[i] = a[i] + b[i]`.
pub fn add<T: Element>(out: &mut [T], a: &[T], b: &[T]) -> Result<()> {
    zip_into(out, a, b, |x: T, y: T| x.lane_add(y))
}

/// `out[i] = |input[i]|`. Signed `MIN` wraps to itself.
pub fn abs<T: Element>(out: &mut [T], input: &[T]) -> Result<()> {
    map_into(out, input, |x: T| x.lane_abs())
}

/// `out[i] = max(lo, min(hi, input[i]))`.
pub fn clamp<T: Element>(out: &mut [T], input: &[T], lo: T, hi: T) -> Result<()> {
    map_into(out, input, move |x: T| x.lane_min(hi).lane_max(lo))
}

/// `out[i] = sqrt(input[i])`; negative inputs give NaN.
pub fn sqrt<T: FloatElement>(out: &mut [T], input: &[T]) -> Result<()> {
    map_into(out, input, |x: T| num_traits::Float::sqrt(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KernelError;

    #[test]
    fn test_scale_matches_scalar_across_boundaries() {
        for n in [0usize, 1, 7, 8, 9, 31, 32, 33, 100] {
            let input: Vec<i32> = (0..n as i32).map(|i| i - 50).collect();
            let mut out = vec![0; n];
            scale(&mut out, &input, 3).unwrap();
            let expected: Vec<i32> = input.iter().map(|&x| x * 3).collect();
            assert_eq!(out, expected, "n={n}");
        }
    }

    #[test]
    fn test_narrow_multiply_takes_scalar_tier() {
        assert_eq!(mul_tier::<i8>(), MulTier::Scalar);
        assert_eq!(mul_tier::<u8>(), MulTier::Scalar);
        assert_eq!(mul_tier::<i16>(), MulTier::Vector);
        assert_eq!(mul_tier::<f32>(), MulTier::Vector);

        let input: Vec<u8> = (0..70).map(|i| (i * 3) as u8).collect();
        let mut out = vec![0u8; 70];
        scale(&mut out, &input, 7).unwrap();
        for (o, x) in out.iter().zip(&input) {
            assert_eq!(*o, x.wrapping_mul(7));
        }
    }

    #[test]
    fn test_scale_in_place() {
        let mut buf: Vec<f64> = (0..13).map(|i| i as f64).collect();
        scale_in_place(&mut buf, 0.5);
        assert_eq!(buf[12], 6.0);
        let mut bytes = vec![100i8; 40];
        scale_in_place(&mut bytes, 2);
        assert!(bytes.iter().all(|&b| b == -56));
    }

    #[test]
    fn test_axpy_and_add() {
        let x = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let y = [1.0f32; 9];
        let mut out = [0.0f32; 9];
        axpy(&mut out, &x, &y, 2.0).unwrap();
        assert_eq!(out[0], 3.0);
        assert_eq!(out[8], 19.0);

        let mut sum = [0u64; 5];
        add(&mut sum, &[1, 2, 3, 4, u64::MAX], &[1, 1, 1, 1, 1]).unwrap();
        assert_eq!(sum, [2, 3, 4, 5, 0]);
    }

    #[test]
    fn test_abs_clamp_sqrt() {
        let mut out = [0i64; 5];
        abs(&mut out, &[-3, 0, 3, i64::MIN, -1]).unwrap();
        assert_eq!(out, [3, 0, 3, i64::MIN, 1]);

        let mut clamped = [0i16; 6];
        clamp(&mut clamped, &[-10, -1, 0, 5, 9, 100], 0, 9).unwrap();
        assert_eq!(clamped, [0, 0, 0, 5, 9, 9]);

        let mut roots = [0.0f64; 3];
        sqrt(&mut roots, &[4.0, 0.0, -1.0]).unwrap();
        assert_eq!(&roots[..2], &[2.0, 0.0]);
        assert!(roots[2].is_nan());
    }

    #[test]
    fn test_map_into_changes_type() {
        let mut out = [false; 10];
        map_into(&mut out, &[0u32, 1, 2, 3, 4, 5, 6, 7, 8, 9], |x: u32| x % 2 == 0).unwrap();
        assert_eq!(out.iter().filter(|&&b| b).count(), 5);
    }

    #[test]
    fn test_length_mismatch() {
        let mut out = [0i32; 3];
        assert_eq!(
            offset(&mut out, &[1, 2], 1),
            Err(KernelError::LengthMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert!(add(&mut out, &[1, 2, 3], &[1, 2]).is_err());
    }

    #[test]
    fn test_empty_is_noop() {
        let mut out: [f64; 0] = [];
        scale(&mut out, &[], 2.0).unwrap();
        map_into(&mut out, &[] as &[f64], |x: f64| x).unwrap();
    }
}
