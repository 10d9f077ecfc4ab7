//! List-shaped operations: prefixes, suffixes, slicing, reversal and
//! run grouping.
//!
//! All outputs are written to the front of a caller-supplied buffer and the
//! number of elements written is returned.

use lanewise_traits::Element;

use crate::lanes::{dispatch_lanes, drive, load, store, Step, WithLanes};
use crate::reduce::first_block;
use crate::simd::dispatch_if_large;
use crate::{ensure_capacity, ensure_same_len, KernelError, Result};

/// Length of the longest prefix of `input` whose elements satisfy `pred`.
fn prefix_len<T: Element>(input: &[T], pred: impl Fn(T) -> bool) -> usize {
    first_block::<T>(input.len(), |i| !pred(input[i])).unwrap_or(input.len())
}

fn copy_front<T: Copy>(out: &mut [T], src: &[T]) -> Result<usize> {
    ensure_capacity(src.len(), out.len())?;
    out[..src.len()].copy_from_slice(src);
    Ok(src.len())
}

/// Copy the longest prefix whose elements satisfy `pred`.
pub fn take_while<T: Element, F: Fn(T) -> bool>(out: &mut [T], input: &[T], pred: F) -> Result<usize> {
    let m = prefix_len(input, pred);
    copy_front(out, &input[..m])
}

/// Copy everything after the longest prefix whose elements satisfy `pred`.
pub fn drop_while<T: Element, F: Fn(T) -> bool>(out: &mut [T], input: &[T], pred: F) -> Result<usize> {
    let m = prefix_len(input, pred);
    copy_front(out, &input[m..])
}

/// [`take_while`] with `x > threshold`.
pub fn take_while_gt<T: Element>(out: &mut [T], input: &[T], threshold: T) -> Result<usize> {
    take_while(out, input, move |x: T| x > threshold)
}

/// [`drop_while`] with `x > threshold`.
pub fn drop_while_gt<T: Element>(out: &mut [T], input: &[T], threshold: T) -> Result<usize> {
    drop_while(out, input, move |x: T| x > threshold)
}

/// The first `min(count, input.len())` elements.
pub fn take_n<T: Copy>(out: &mut [T], input: &[T], count: usize) -> Result<usize> {
    copy_front(out, &input[..count.min(input.len())])
}

/// Everything after the first `count` elements.
pub fn drop_n<T: Copy>(out: &mut [T], input: &[T], count: usize) -> Result<usize> {
    copy_front(out, &input[count.min(input.len())..])
}

/// Elements `start..end`, with both bounds clamped to `input.len()`.
///
/// `start > end` is an [`InvalidRange`](KernelError::InvalidRange).
pub fn slice<T: Copy>(out: &mut [T], input: &[T], start: usize, end: usize) -> Result<usize> {
    if start > end {
        return Err(KernelError::InvalidRange {
            start,
            end,
            len: input.len(),
        });
    }
    let end = end.min(input.len());
    let start = start.min(end);
    copy_front(out, &input[start..end])
}

struct Reverse<'a, T> {
    out: &'a mut [T],
    input: &'a [T],
}

impl<T: Element> WithLanes for Reverse<'_, T> {
    type Output = ();

    #[inline(always)]
    fn with_lanes<const K: usize>(self) {
        let Reverse { out, input } = self;
        let n = input.len();
        drive::<K>(n, |step| match step {
            Step::Scalar(j) => out[n - 1 - j] = input[j],
            _ => {
                for s in step.blocks::<K>() {
                    let mut v: [T; K] = load(input, s);
                    v.reverse();
                    store(out, n - s - K, &v);
                }
            }
        });
    }
}

/// `out[i] = input[n - 1 - i]`.
pub fn reverse<T: Element>(out: &mut [T], input: &[T]) -> Result<()> {
    ensure_same_len(input.len(), out.len())?;
    dispatch_if_large(input.len(), || {
        dispatch_lanes::<T, _>(Reverse { out, input })
    });
    Ok(())
}

/// `a` followed by `b`.
pub fn concat<T: Copy>(out: &mut [T], a: &[T], b: &[T]) -> Result<usize> {
    let total = a.len() + b.len();
    ensure_capacity(total, out.len())?;
    out[..a.len()].copy_from_slice(a);
    out[a.len()..total].copy_from_slice(b);
    Ok(total)
}

/// Fill `out` with `value`.
pub fn replicate<T: Copy>(out: &mut [T], value: T) {
    out.fill(value);
}

/// Interleaved `[0, x0, 1, x1, ...]`. Indices are converted with
/// [`Element::from_count`] and wrap for narrow types.
pub fn zip_with_index<T: Element>(out: &mut [T], input: &[T]) -> Result<usize> {
    let total = 2 * input.len();
    ensure_capacity(total, out.len())?;
    for (i, (pair, &x)) in out[..total].chunks_exact_mut(2).zip(input).enumerate() {
        pair[0] = T::from_count(i);
        pair[1] = x;
    }
    Ok(total)
}

/// Visit each maximal run of equal adjacent elements as `(value, length)`.
fn for_each_run<T: Element>(input: &[T], mut visit: impl FnMut(usize, T, usize)) -> usize {
    let mut runs = 0;
    let mut start = 0;
    for i in 1..=input.len() {
        if i == input.len() || input[i] != input[start] {
            if i > start {
                visit(runs, input[start], i - start);
                runs += 1;
            }
            start = i;
        }
    }
    runs
}

/// Group consecutive equal elements: run values go to `values`, run
/// lengths to `counts`. Returns the number of runs.
///
/// Both outputs must hold `input.len()` entries.
pub fn group<T: Element>(values: &mut [T], counts: &mut [usize], input: &[T]) -> Result<usize> {
    ensure_capacity(input.len(), values.len())?;
    ensure_capacity(input.len(), counts.len())?;
    Ok(for_each_run(input, |r, v, len| {
        values[r] = v;
        counts[r] = len;
    }))
}

/// Run-length encoding, interleaved `[v0, len0, v1, len1, ...]`.
///
/// Returns the number of output elements (twice the number of runs). `out`
/// must hold `2 * input.len()` elements. Run lengths are converted with
/// [`Element::from_count`].
pub fn run_length_encode<T: Element>(out: &mut [T], input: &[T]) -> Result<usize> {
    ensure_capacity(2 * input.len(), out.len())?;
    let runs = for_each_run(input, |r, v, len| {
        out[2 * r] = v;
        out[2 * r + 1] = T::from_count(len);
    });
    Ok(2 * runs)
}
