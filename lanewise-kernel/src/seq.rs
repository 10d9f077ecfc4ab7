//! Sequence generation.

use lanewise_traits::{Element, IntElement};

use crate::lanes::{dispatch_lanes, drive, store, Step, WithLanes};
use crate::simd::dispatch_if_large;
use crate::{KernelError, Result};

struct Arithmetic<'a, T> {
    out: &'a mut [T],
    start: T,
    step: T,
}

impl<T: Element> WithLanes for Arithmetic<'_, T> {
    type Output = ();

    #[inline(always)]
    fn with_lanes<const K: usize>(self) {
        let Arithmetic {
            out,
            start,
            step: stride,
        } = self;
        let term = |i: usize| start.lane_add(T::from_count(i).lane_mul(stride));
        drive::<K>(out.len(), |step| match step {
            Step::Scalar(j) => out[j] = term(j),
            _ => {
                for s in step.blocks::<K>() {
                    let v: [T; K] = std::array::from_fn(|l| term(s + l));
                    store(out, s, &v);
                }
            }
        });
    }
}

/// `out[i] = start + i * step`.
///
/// Each term is computed from its index rather than by repeated addition,
/// so integer results equal the wrapping recurrence exactly and float
/// results do not accumulate rounding error along the sequence.
pub fn iterate_add<T: Element>(out: &mut [T], start: T, step: T) {
    log::trace!("iterate_add<{}>: n={}", std::any::type_name::<T>(), out.len());
    let n = out.len();
    dispatch_if_large(n, || dispatch_lanes::<T, _>(Arithmetic { out, start, step }));
}

/// `out[0] = start`, `out[i] = out[i - 1] * factor`.
pub fn iterate_mul<T: Element>(out: &mut [T], start: T, factor: T) {
    let mut x = start;
    for o in out.iter_mut() {
        *o = x;
        x = x.lane_mul(factor);
    }
}

/// `[start, end)` with unit step. Returns `max(0, end - start)`.
pub fn range<T: IntElement>(out: &mut [T], start: T, end: T) -> Result<usize> {
    if end <= start {
        return Ok(0);
    }
    let needed = end
        .checked_sub(&start)
        .and_then(|span| span.to_usize())
        .unwrap_or(usize::MAX);
    if needed > out.len() {
        return Err(KernelError::OutputTooSmall {
            needed,
            available: out.len(),
        });
    }
    iterate_add(&mut out[..needed], start, T::ONE);
    Ok(needed)
}
