//! Out-of-place sorting. Inputs are never mutated.
//!
//! [`sort_into`] is an LSD radix sort over [`Element::radix_key`], one byte
//! per pass. Each pass is a stable counting sort: a 256-bucket histogram,
//! an exclusive prefix scan of the histogram for the bucket offsets, then a
//! scatter. Passes where every key shares the same byte are skipped.
//!
//! Floats are ordered by the IEEE total order: `-NaN < -inf < ... < -0.0 <
//! +0.0 < ... < +inf < +NaN`.

use std::cmp::Ordering;

use lanewise_traits::Element;

use crate::scan::scan_exclusive_add;
use crate::{ensure_same_len, Result};

const RADIX: usize = 256;

#[inline(always)]
fn digit<T: Element>(x: T, shift: usize) -> usize {
    ((x.radix_key() >> shift) & 0xFF) as usize
}

/// Write `input` sorted ascending into `out`.
pub fn sort_into<T: Element>(out: &mut [T], input: &[T]) -> Result<()> {
    ensure_same_len(input.len(), out.len())?;
    let n = input.len();
    out.copy_from_slice(input);
    if n < 2 {
        return Ok(());
    }

    let mut scratch = vec![T::ZERO; n];
    let mut hist = [0u64; RADIX];
    let mut offsets = [0u64; RADIX];
    // Which buffer holds the current pass input.
    let mut in_out = true;
    let mut skipped = 0;

    for pass in 0..T::KEY_BYTES {
        let shift = pass * 8;
        let (src, dst): (&[T], &mut [T]) = if in_out {
            (&*out, &mut scratch[..])
        } else {
            (&scratch[..], &mut *out)
        };

        hist.fill(0);
        for &x in src {
            hist[digit(x, shift)] += 1;
        }
        if hist.iter().any(|&c| c as usize == n) {
            skipped += 1;
            continue;
        }

        scan_exclusive_add(&mut offsets, &hist)?;
        for &x in src {
            let b = digit(x, shift);
            dst[offsets[b] as usize] = x;
            offsets[b] += 1;
        }
        in_out = !in_out;
    }

    if !in_out {
        out.copy_from_slice(&scratch);
    }
    log::debug!(
        "sort_into<{}>: n={} passes={} skipped={}",
        std::any::type_name::<T>(),
        n,
        T::KEY_BYTES,
        skipped
    );
    Ok(())
}

/// Write `input` into `out` stably sorted by `cmp`. Works for any `Clone`
/// type.
pub fn sort_by_into<T, F>(out: &mut [T], input: &[T], cmp: F) -> Result<()>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    ensure_same_len(input.len(), out.len())?;
    out.clone_from_slice(input);
    out.sort_by(cmp);
    Ok(())
}
