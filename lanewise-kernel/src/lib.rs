//! Lane-parallel kernels over flat numeric buffers.
//!
//! Every kernel is a stateless, synchronous function over caller-owned slices.
//! Work is split by the lane/tail dispatcher ([`drive`]) into `UNROLL × K`
//! super-blocks, then `K`-lane blocks, then a scalar tail, where `K` is the
//! element's lane width ([`Element::LANES`]).
//!
//! # Kernel families
//!
//! ## Map / Zip
//!
//! - [`map_into`], [`zip_into`]: general element-wise closures
//! - [`scale`], [`scale_in_place`], [`offset`], [`axpy`], [`add`], [`abs`],
//!   [`clamp`], [`sqrt`]
//!
//! ## Reductions (horizontal-reduction engine)
//!
//! - [`reduce_add`], [`reduce_mul`], [`reduce_max`], [`reduce_min`]
//! - [`fold_dot`], [`fold_sumsq`], [`fold_sad`], [`foldl`]
//! - [`reduce_and`], [`reduce_or`], [`count_eq`]
//!
//! ## Scan
//!
//! - [`scan_add`], [`scan_exclusive_add`], [`scan_with`]
//!
//! ## Stream compaction (permutation LUT)
//!
//! - [`filter`], [`filter_gt`], [`filter_count`], [`partition`], [`partition_gt`]
//! - [`unique_adjacent`], [`union_sorted`], [`intersect_sorted`]
//!
//! ## Supporting operations
//!
//! - predicates: [`all_eq`], [`any_gt`], [`all_gt_zip`], [`contains`], [`find_index`]
//! - list: [`take_while`], [`drop_while`], [`take_n`], [`drop_n`], [`slice`],
//!   [`reverse`], [`concat`], [`replicate`], [`zip_with_index`], [`group`],
//!   [`run_length_encode`]
//! - sequences: [`iterate_add`], [`iterate_mul`], [`range`]
//! - sorting: [`sort_into`], [`sort_by_into`]
//! - generic dispatch bridge for arbitrary structs: [`bridge`]
//!
//! # Example
//!
//! ```rust
//! use lanewise_kernel::{filter_gt, scan_add, reduce_add};
//!
//! let data = [-2i64, 3, -1, 4];
//! let mut kept = [0i64; 4];
//! let n = filter_gt(&mut kept, &data, 0).unwrap();
//! assert_eq!(&kept[..n], &[3, 4]);
//!
//! let mut prefix = [0i64; 4];
//! scan_add(&mut prefix, &[1, 2, 3, 4]).unwrap();
//! assert_eq!(prefix, [1, 3, 6, 10]);
//!
//! assert_eq!(reduce_add::<i64>(&[]), 0);
//! ```

mod compact;
mod lanes;
mod list;
mod map;
mod predicate;
mod reduce;
mod scan;
mod seq;
mod simd;
mod sort;

pub mod bridge;
pub mod lut;

pub use lanewise_traits::{Element, FloatElement, IntElement, REGISTER_BYTES};

// ============================================================================
// Lane/tail dispatcher
// ============================================================================
pub use lanes::{
    dispatch_lanes, dispatch_width, drive, lanes_for_size, split_lanes, LaneSplit, Step, WithLanes,
};

// ============================================================================
// Map / zip
// ============================================================================
pub use map::{
    abs, add, axpy, clamp, map_into, mul_tier, offset, scale, scale_in_place, sqrt, zip_into,
    MulTier,
};

// ============================================================================
// Reductions
// ============================================================================
pub use reduce::{
    count_eq, fold_dot, fold_sad, fold_sumsq, foldl, horizontal, reduce_add, reduce_and,
    reduce_max, reduce_min, reduce_mul, reduce_or, Accumulator,
};

// ============================================================================
// Predicates, scan, compaction, list, sequences, sort
// ============================================================================
pub use compact::{
    filter, filter_count, filter_gt, intersect_sorted, partition, partition_gt, union_sorted,
    unique_adjacent, unique_in_place,
};
pub use list::{
    concat, drop_n, drop_while, drop_while_gt, group, replicate, reverse, run_length_encode,
    slice, take_n, take_while, take_while_gt, zip_with_index,
};
pub use predicate::{all_eq, all_gt_zip, any_gt, contains, find_index};
pub use scan::{scan_add, scan_exclusive_add, scan_with};
pub use seq::{iterate_add, iterate_mul, range};
pub use simd::MaybeSimdOps;
pub use sort::{sort_by_into, sort_into};

// ============================================================================
// Constants
// ============================================================================

/// Number of independent accumulator chains, and the number of `K`-lane
/// blocks in one super-block of the dispatcher.
pub const UNROLL: usize = 4;

/// Below this many elements, runtime target-feature dispatch is skipped.
pub const DISPATCH_THRESHOLD: usize = 64;

/// Widest mask handled by a single permutation-table lookup. Wider lane
/// counts are compacted in groups of this many lanes.
pub const MAX_LUT_LANES: usize = 8;

/// Relative tolerance for f64 sums against a left-to-right scalar sum.
pub const SUM_REL_TOL: f64 = 1e-9;

/// Relative tolerance for long f64 dot products against a scalar fold.
pub const DOT_REL_TOL: f64 = 1e-6;

/// Relative tolerance for f32 accumulation.
pub const F32_REL_TOL: f32 = 1e-4;

// ============================================================================
// Error types
// ============================================================================

/// Precondition violations reported at the kernel API boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    /// Two buffers that must have equal length do not.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A caller-supplied output buffer cannot hold the result.
    #[error("output too small: need {needed}, have {available}")]
    OutputTooSmall { needed: usize, available: usize },

    /// A `[start, end)` range is not valid for a buffer of `len` elements.
    #[error("invalid range {start}..{end} for length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// A byte buffer is not a whole number of `elem_size`-byte elements.
    #[error("invalid element size {elem_size} for buffer of {len} bytes")]
    InvalidElementSize { elem_size: usize, len: usize },
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;

#[inline]
pub(crate) fn ensure_same_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(KernelError::LengthMismatch { expected, actual });
    }
    Ok(())
}

#[inline]
pub(crate) fn ensure_capacity(needed: usize, available: usize) -> Result<()> {
    if available < needed {
        return Err(KernelError::OutputTooSmall { needed, available });
    }
    Ok(())
}
