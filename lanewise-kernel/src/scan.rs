//! Prefix scans.
//!
//! Each `K`-lane block is scanned locally in `log2(K)` shift-and-add steps
//! (a Hillis-Steele scan on the register), then the running total of all
//! previous blocks is broadcast and added to every lane:
//!
//! ```text
//!   x      = [1 2 3 4]        carry = 10
//!   shift1 = [1 3 5 7]
//!   shift2 = [1 3 6 10]
//!   + 10   = [11 13 16 20]    carry = 20
//! ```
//!
//! The carry is the only state passed between blocks, so blocks are
//! processed strictly in order. The scalar tail continues the carry.

use lanewise_traits::Element;

use crate::lanes::{dispatch_lanes, drive, load, store, Step, WithLanes};
use crate::simd::dispatch_if_large;
use crate::{ensure_same_len, Result};

/// Inclusive scan of one register.
#[inline(always)]
fn local_scan<T: Element, const K: usize>(v: &mut [T; K]) {
    let mut shift = 1;
    while shift < K {
        let prev = *v;
        for l in shift..K {
            v[l] = v[l].lane_add(prev[l - shift]);
        }
        shift <<= 1;
    }
}

struct AddScan<'a, T> {
    out: &'a mut [T],
    input: &'a [T],
    exclusive: bool,
}

impl<T: Element> WithLanes for AddScan<'_, T> {
    type Output = ();

    #[inline(always)]
    fn with_lanes<const K: usize>(self) {
        let AddScan {
            out,
            input,
            exclusive,
        } = self;
        let mut carry = T::ZERO;
        drive::<K>(input.len(), |step| match step {
            Step::Scalar(j) => {
                let next = carry.lane_add(input[j]);
                out[j] = if exclusive { carry } else { next };
                carry = next;
            }
            _ => {
                for s in step.blocks::<K>() {
                    let mut v: [T; K] = load(input, s);
                    local_scan(&mut v);
                    let block: [T; K] = if exclusive {
                        std::array::from_fn(|l| if l == 0 { carry } else { carry.lane_add(v[l - 1]) })
                    } else {
                        v.map(|x| carry.lane_add(x))
                    };
                    carry = carry.lane_add(v[K - 1]);
                    store(out, s, &block);
                }
            }
        });
    }
}

fn add_scan<T: Element>(out: &mut [T], input: &[T], exclusive: bool) -> Result<()> {
    ensure_same_len(input.len(), out.len())?;
    log::trace!(
        "scan<{}>: n={} lanes={} exclusive={}",
        std::any::type_name::<T>(),
        input.len(),
        T::LANES,
        exclusive
    );
    dispatch_if_large(input.len(), || {
        dispatch_lanes::<T, _>(AddScan {
            out,
            input,
            exclusive,
        })
    });
    Ok(())
}

/// Inclusive prefix sum: `out[i] = input[0] + ... + input[i]`.
///
/// Integers wrap in the element type. Floats agree with a sequential scan
/// within the crate's relative tolerances.
pub fn scan_add<T: Element>(out: &mut [T], input: &[T]) -> Result<()> {
    add_scan(out, input, false)
}

/// Exclusive prefix sum: `out[0] = 0`, `out[i] = input[0] + ... + input[i - 1]`.
pub fn scan_exclusive_add<T: Element>(out: &mut [T], input: &[T]) -> Result<()> {
    add_scan(out, input, true)
}

/// General inclusive scan, strictly sequential:
/// `out[0] = input[0]`, `out[i] = f(out[i - 1], input[i])`.
pub fn scan_with<T: Copy, F: FnMut(T, T) -> T>(out: &mut [T], input: &[T], mut f: F) -> Result<()> {
    ensure_same_len(input.len(), out.len())?;
    let mut acc: Option<T> = None;
    for (o, &x) in out.iter_mut().zip(input) {
        let next = match acc {
            Some(prev) => f(prev, x),
            None => x,
        };
        *o = next;
        acc = Some(next);
    }
    Ok(())
}
