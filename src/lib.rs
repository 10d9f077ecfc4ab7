//! Lane-parallel kernels for flat numeric buffers.
//!
//! This crate is the umbrella over the `lanewise` workspace:
//!
//! - [`lanewise_traits`]: the [`Element`] contract (lane width, identities,
//!   wrapping arithmetic, radix keys)
//! - [`lanewise_kernel`]: the lane/tail dispatcher and the map, reduction,
//!   scan, stream-compaction and sorting kernels, re-exported at the root
//! - [`stats`]: descriptive statistics, regression and rolling windows
//!
//! # Primary API
//!
//! ## Map / Zip
//!
//! - [`map_into`], [`zip_into`], [`scale`], [`axpy`], [`clamp`], [`sqrt`]
//!
//! ## Reductions
//!
//! - [`reduce_add`], [`reduce_mul`], [`reduce_max`], [`reduce_min`]
//! - [`fold_dot`], [`fold_sumsq`], [`fold_sad`]
//!
//! ## Scan and compaction
//!
//! - [`scan_add`], [`scan_exclusive_add`]
//! - [`filter`], [`partition`], [`unique_adjacent`], [`union_sorted`],
//!   [`intersect_sorted`]
//!
//! ## Arbitrary element types
//!
//! - [`bridge`]: the same dispatcher over user structs and raw byte records
//!
//! # Example
//!
//! ```rust
//! use lanewise::{filter_gt, reduce_add, stats};
//!
//! let samples = [1.5f64, -0.5, 2.5, 4.0, -3.0, 0.5];
//! let mut positive = [0.0; 6];
//! let n = filter_gt(&mut positive, &samples, 0.0).unwrap();
//! assert_eq!(&positive[..n], &[1.5, 2.5, 4.0, 0.5]);
//! assert_eq!(reduce_add(&positive[..n]), 8.5);
//!
//! let summary = stats::descriptive(&positive[..n]).unwrap();
//! assert_eq!(summary.mean, 2.125);
//! ```

pub use lanewise_kernel::*;
pub use lanewise_stats as stats;
pub use lanewise_traits;
pub use lanewise_kernel;
