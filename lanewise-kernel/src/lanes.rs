//! Lane/tail dispatch shared by every kernel.
//!
//! A kernel is written once, generic over a const lane width `K`, and
//! monomorphised for the element's [`Element::LANES`] by [`dispatch_lanes`].
//! Inside, [`drive`] walks `[0, n)` in descending block sizes:
//!
//! ```text
//!   |<-- UNROLL*K -->|<-- UNROLL*K -->| K | K | 1 1 1 |
//!   |     Wide       |     Wide       |Blk|Blk| tail  |
//! ```
//!
//! so every index is visited exactly once for any `n`, including `n = 0`.

use std::iter::StepBy;
use std::ops::{ControlFlow, Range};

use lanewise_traits::{Element, REGISTER_BYTES};

use crate::UNROLL;

/// A kernel body generic over the lane width.
///
/// Mirrors `pulp::WithSimd`: the operation's state lives in `self`, and
/// [`dispatch_lanes`] picks the `K` to instantiate.
pub trait WithLanes {
    type Output;

    fn with_lanes<const K: usize>(self) -> Self::Output;
}

/// Instantiate `op` for the lane width of `T`.
#[inline(always)]
pub fn dispatch_lanes<T: Element, W: WithLanes>(op: W) -> W::Output {
    dispatch_width(T::LANES, op)
}

/// Instantiate `op` for a runtime lane count, rounded down to a supported
/// width (32, 16, 8, 4, 2 or 1).
#[inline(always)]
pub fn dispatch_width<W: WithLanes>(lanes: usize, op: W) -> W::Output {
    match lanes {
        32.. => op.with_lanes::<32>(),
        16..=31 => op.with_lanes::<16>(),
        8..=15 => op.with_lanes::<8>(),
        4..=7 => op.with_lanes::<4>(),
        2..=3 => op.with_lanes::<2>(),
        _ => op.with_lanes::<1>(),
    }
}

/// Lane count for values of `bytes` bytes: how many fit one register, at
/// least one.
pub const fn lanes_for_size(bytes: usize) -> usize {
    if bytes == 0 || bytes >= REGISTER_BYTES {
        1
    } else {
        REGISTER_BYTES / bytes
    }
}

/// How `n` elements divide into super-blocks, blocks and a scalar tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneSplit {
    /// Number of `UNROLL * K` super-blocks.
    pub wide: usize,
    /// Number of `K`-lane blocks after the super-blocks (`< UNROLL`).
    pub blocks: usize,
    /// Scalar remainder (`< K`).
    pub tail: usize,
}

impl LaneSplit {
    /// Elements covered by vector work (super-blocks and blocks).
    pub const fn vector_len(&self, k: usize) -> usize {
        (self.wide * UNROLL + self.blocks) * k
    }
}

/// Split `n` elements for lane width `k` (`k >= 1`).
pub const fn split_lanes(n: usize, k: usize) -> LaneSplit {
    let wide = n / (UNROLL * k);
    let rest = n - wide * UNROLL * k;
    let blocks = rest / k;
    LaneSplit {
        wide,
        blocks,
        tail: rest - blocks * k,
    }
}

/// One unit of work handed out by [`drive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `UNROLL` consecutive `K`-lane blocks starting at this index.
    Wide(usize),
    /// A single `K`-lane block starting at this index.
    Block(usize),
    /// A single element of the scalar tail.
    Scalar(usize),
}

impl Step {
    /// Start offsets of the `K`-lane blocks covered by this step.
    /// Empty for [`Step::Scalar`].
    #[inline(always)]
    pub fn blocks<const K: usize>(self) -> StepBy<Range<usize>> {
        let range = match self {
            Step::Wide(s) => s..s + UNROLL * K,
            Step::Block(s) => s..s + K,
            Step::Scalar(j) => j..j,
        };
        range.step_by(K)
    }
}

/// Visit `[0, n)` in descending block sizes.
#[inline(always)]
pub fn drive<const K: usize>(n: usize, mut visit: impl FnMut(Step)) {
    let split = split_lanes(n, K);
    let mut i = 0;
    for _ in 0..split.wide {
        visit(Step::Wide(i));
        i += UNROLL * K;
    }
    for _ in 0..split.blocks {
        visit(Step::Block(i));
        i += K;
    }
    while i < n {
        visit(Step::Scalar(i));
        i += 1;
    }
}

/// [`drive`] with early exit: stops at the first step that breaks.
#[inline(always)]
pub(crate) fn drive_until<const K: usize, B>(
    n: usize,
    mut visit: impl FnMut(Step) -> ControlFlow<B>,
) -> Option<B> {
    let split = split_lanes(n, K);
    let mut i = 0;
    for _ in 0..split.wide {
        if let ControlFlow::Break(b) = visit(Step::Wide(i)) {
            return Some(b);
        }
        i += UNROLL * K;
    }
    for _ in 0..split.blocks {
        if let ControlFlow::Break(b) = visit(Step::Block(i)) {
            return Some(b);
        }
        i += K;
    }
    while i < n {
        if let ControlFlow::Break(b) = visit(Step::Scalar(i)) {
            return Some(b);
        }
        i += 1;
    }
    None
}

/// Copy `K` lanes starting at `start` into a register-shaped array.
#[inline(always)]
pub(crate) fn load<T: Copy, const K: usize>(src: &[T], start: usize) -> [T; K] {
    let lanes = &src[start..start + K];
    std::array::from_fn(|l| lanes[l])
}

/// Write all `K` lanes of `v` at `start`.
#[inline(always)]
pub(crate) fn store<T: Copy, const K: usize>(dst: &mut [T], start: usize, v: &[T; K]) {
    dst[start..start + K].copy_from_slice(v);
}
