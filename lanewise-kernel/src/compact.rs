//! Stream compaction: filter, partition, unique and sorted-set operations.
//!
//! Per `K`-lane block:
//!
//! 1. evaluate the predicate on every lane into a `K`-bit mask,
//! 2. skip the block when the mask is empty, copy it whole when full,
//! 3. otherwise gather each group of up to 8 lanes through its
//!    [permutation table](crate::lut) row and store the first
//!    `popcount` lanes at the output cursor.
//!
//! The cursor only ever advances, and it never passes the start of the
//! block being read, which is what makes the in-place variant safe.

use lanewise_traits::Element;

use crate::lanes::{dispatch_lanes, drive, load, Step, WithLanes};
use crate::lut::{compress_into, compress_split, group_width};
use crate::reduce::fold_lanes;
use crate::simd::dispatch_if_large;
use crate::{ensure_capacity, Result};

#[inline(always)]
const fn full_mask(k: usize) -> u32 {
    u32::MAX >> (32 - k)
}

#[inline(always)]
fn block_mask<const K: usize>(start: usize, keep: &mut impl FnMut(usize) -> bool) -> u32 {
    let mut mask = 0u32;
    for l in 0..K {
        mask |= u32::from(keep(start + l)) << l;
    }
    mask
}

/// Store the lanes of `block` selected by `mask` at the front of `out`.
#[inline(always)]
fn pack_block<T: Element>(out: &mut [T], block: &[T], mask: u32) -> usize {
    let k = block.len();
    if mask == 0 {
        return 0;
    }
    if mask == full_mask(k) {
        out[..k].copy_from_slice(block);
        return k;
    }
    let g = group_width(k);
    let mut written = 0;
    for (gi, group) in block.chunks_exact(g).enumerate() {
        let bits = (mask >> (gi * g)) as u8;
        written += compress_into(&mut out[written..], group, bits);
    }
    written
}

/// Store selected lanes at the front of `pass` and the rest at the front of
/// `fail`.
#[inline(always)]
fn split_block<T: Element>(pass: &mut [T], fail: &mut [T], block: &[T], mask: u32) -> (usize, usize) {
    let k = block.len();
    if mask == 0 {
        fail[..k].copy_from_slice(block);
        return (0, k);
    }
    if mask == full_mask(k) {
        pass[..k].copy_from_slice(block);
        return (k, 0);
    }
    let g = group_width(k);
    let (mut p, mut f) = (0, 0);
    for (gi, group) in block.chunks_exact(g).enumerate() {
        let bits = (mask >> (gi * g)) as u8;
        let (dp, df) = compress_split(&mut pass[p..], &mut fail[f..], group, bits);
        p += dp;
        f += df;
    }
    (p, f)
}

// ----------------------------------------------------------------------------
// Kernel bodies
// ----------------------------------------------------------------------------

/// Compaction of `input` driven by an index predicate.
///
/// `keep` is called exactly once per index, in increasing index order, so it
/// may carry state (the sorted intersection uses this).
struct Compact<'a, T, P> {
    out: &'a mut [T],
    input: &'a [T],
    keep: P,
}

impl<T: Element, P: FnMut(usize) -> bool> WithLanes for Compact<'_, T, P> {
    type Output = usize;

    #[inline(always)]
    fn with_lanes<const K: usize>(self) -> usize {
        let Compact {
            out,
            input,
            mut keep,
        } = self;
        let mut cursor = 0;
        drive::<K>(input.len(), |step| match step {
            Step::Scalar(j) => {
                if keep(j) {
                    out[cursor] = input[j];
                    cursor += 1;
                }
            }
            _ => {
                for s in step.blocks::<K>() {
                    let mask = block_mask::<K>(s, &mut keep);
                    cursor += pack_block(&mut out[cursor..], &input[s..s + K], mask);
                }
            }
        });
        cursor
    }
}

struct Partition<'a, T, P> {
    pass: &'a mut [T],
    fail: &'a mut [T],
    input: &'a [T],
    keep: P,
}

impl<T: Element, P: FnMut(usize) -> bool> WithLanes for Partition<'_, T, P> {
    type Output = (usize, usize);

    #[inline(always)]
    fn with_lanes<const K: usize>(self) -> (usize, usize) {
        let Partition {
            pass,
            fail,
            input,
            mut keep,
        } = self;
        let (mut p, mut f) = (0, 0);
        drive::<K>(input.len(), |step| match step {
            Step::Scalar(j) => {
                if keep(j) {
                    pass[p] = input[j];
                    p += 1;
                } else {
                    fail[f] = input[j];
                    f += 1;
                }
            }
            _ => {
                for s in step.blocks::<K>() {
                    let mask = block_mask::<K>(s, &mut keep);
                    let (dp, df) =
                        split_block(&mut pass[p..], &mut fail[f..], &input[s..s + K], mask);
                    p += dp;
                    f += df;
                }
            }
        });
        (p, f)
    }
}

/// Adjacent-duplicate removal within one buffer.
struct UniqueInPlace<'a, T> {
    buf: &'a mut [T],
}

impl<T: Element> WithLanes for UniqueInPlace<'_, T> {
    type Output = usize;

    #[inline(always)]
    fn with_lanes<const K: usize>(self) -> usize {
        let buf = self.buf;
        let n = buf.len();
        let mut cursor = 0;
        // Last element of the previous block as it was before any writes.
        let mut prev: Option<T> = None;
        drive::<K>(n, |step| match step {
            Step::Scalar(j) => {
                let x = buf[j];
                if prev != Some(x) {
                    buf[cursor] = x;
                    cursor += 1;
                }
                prev = Some(x);
            }
            _ => {
                for s in step.blocks::<K>() {
                    let v: [T; K] = load(buf, s);
                    let mut mask = u32::from(prev != Some(v[0]));
                    for l in 1..K {
                        mask |= u32::from(v[l] != v[l - 1]) << l;
                    }
                    prev = Some(v[K - 1]);
                    cursor += pack_block(&mut buf[cursor..], &v, mask);
                }
            }
        });
        cursor
    }
}

fn compact_by<T: Element>(out: &mut [T], input: &[T], keep: impl FnMut(usize) -> bool) -> usize {
    dispatch_if_large(input.len(), || {
        dispatch_lanes::<T, _>(Compact { out, input, keep })
    })
}

// ----------------------------------------------------------------------------
// Filter / partition
// ----------------------------------------------------------------------------

/// Copy the elements satisfying `pred` to the front of `out`, in order.
///
/// Returns the number of survivors. `out` must hold `input.len()` elements
/// (the worst case).
pub fn filter<T: Element, F: Fn(T) -> bool>(out: &mut [T], input: &[T], pred: F) -> Result<usize> {
    ensure_capacity(input.len(), out.len())?;
    log::trace!(
        "filter<{}>: n={} lanes={}",
        std::any::type_name::<T>(),
        input.len(),
        T::LANES
    );
    Ok(compact_by(out, input, |i| pred(input[i])))
}

/// [`filter`] with `x > threshold`.
pub fn filter_gt<T: Element>(out: &mut [T], input: &[T], threshold: T) -> Result<usize> {
    filter(out, input, move |x: T| x > threshold)
}

/// Number of elements satisfying `pred`.
pub fn filter_count<T: Element, F: Fn(T) -> bool>(input: &[T], pred: F) -> usize {
    fold_lanes::<T, usize>(
        input.len(),
        0,
        |i| usize::from(pred(input[i])),
        |a, b| a + b,
    )
}

/// Split `input` into the elements satisfying `pred` (front of `pass`) and
/// the rest (front of `fail`), both order-preserving.
///
/// Returns `(pass_count, fail_count)`. Each output must hold `input.len()`
/// elements.
pub fn partition<T: Element, F: Fn(T) -> bool>(
    pass: &mut [T],
    fail: &mut [T],
    input: &[T],
    pred: F,
) -> Result<(usize, usize)> {
    ensure_capacity(input.len(), pass.len())?;
    ensure_capacity(input.len(), fail.len())?;
    log::trace!(
        "partition<{}>: n={} lanes={}",
        std::any::type_name::<T>(),
        input.len(),
        T::LANES
    );
    let keep = |i: usize| pred(input[i]);
    Ok(dispatch_if_large(input.len(), || {
        dispatch_lanes::<T, _>(Partition {
            pass,
            fail,
            input,
            keep,
        })
    }))
}

/// [`partition`] with `x > threshold`.
pub fn partition_gt<T: Element>(
    pass: &mut [T],
    fail: &mut [T],
    input: &[T],
    threshold: T,
) -> Result<(usize, usize)> {
    partition(pass, fail, input, move |x: T| x > threshold)
}

// ----------------------------------------------------------------------------
// Unique and sorted-set operations
// ----------------------------------------------------------------------------

/// Drop every element equal to its predecessor. On sorted input this leaves
/// each distinct value once.
///
/// `out` must hold `input.len()` elements.
pub fn unique_adjacent<T: Element>(out: &mut [T], input: &[T]) -> Result<usize> {
    ensure_capacity(input.len(), out.len())?;
    log::trace!("unique_adjacent<{}>: n={}", std::any::type_name::<T>(), input.len());
    Ok(compact_by(out, input, |i| i == 0 || input[i] != input[i - 1]))
}

/// [`unique_adjacent`] within `buf`; the distinct run heads end up in
/// `buf[..count]`.
pub fn unique_in_place<T: Element>(buf: &mut [T]) -> usize {
    let n = buf.len();
    dispatch_if_large(n, || dispatch_lanes::<T, _>(UniqueInPlace { buf }))
}

/// Sorted union of two sorted inputs with duplicates collapsed.
///
/// `out` must hold `a.len() + b.len()` elements; it is used as merge scratch.
pub fn union_sorted<T: Element>(out: &mut [T], a: &[T], b: &[T]) -> Result<usize> {
    let total = a.len() + b.len();
    ensure_capacity(total, out.len())?;
    log::trace!(
        "union_sorted<{}>: a={} b={}",
        std::any::type_name::<T>(),
        a.len(),
        b.len()
    );
    let (mut i, mut j) = (0, 0);
    for slot in out[..total].iter_mut() {
        let take_a = j == b.len() || (i < a.len() && a[i] <= b[j]);
        if take_a {
            *slot = a[i];
            i += 1;
        } else {
            *slot = b[j];
            j += 1;
        }
    }
    Ok(unique_in_place(&mut out[..total]))
}

/// Values present in both sorted inputs, each once, in ascending order.
///
/// `out` must hold `min(a.len(), b.len())` elements.
pub fn intersect_sorted<T: Element>(out: &mut [T], a: &[T], b: &[T]) -> Result<usize> {
    ensure_capacity(a.len().min(b.len()), out.len())?;
    log::trace!(
        "intersect_sorted<{}>: a={} b={}",
        std::any::type_name::<T>(),
        a.len(),
        b.len()
    );
    let mut j = 0;
    let keep = |i: usize| {
        let x = a[i];
        while j < b.len() && b[j] < x {
            j += 1;
        }
        j < b.len() && b[j] == x && (i == 0 || a[i - 1] != x)
    };
    Ok(compact_by(out, a, keep))
}
