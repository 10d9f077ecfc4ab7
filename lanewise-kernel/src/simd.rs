//! Target-feature dispatch for the lane kernels and the f32/f64 sum/dot
//! fast path.
//!
//! Every map, scan and compaction entry point wraps its `dispatch_lanes`
//! call in [`dispatch_if_large`], so the `[T; K]` block loops are compiled
//! for the host's widest ISA once a buffer passes [`DISPATCH_THRESHOLD`].
//! `reduce_add`, `fold_dot` and `fold_sumsq` ask [`MaybeSimdOps`] first and
//! fall back to the portable accumulator kernels on `None`.

use crate::DISPATCH_THRESHOLD;

/// Run `f` with the host's target features enabled. Without the `simd`
/// feature this is a plain call.
#[inline(always)]
pub(crate) fn dispatch<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(feature = "simd")]
    {
        pulp::Arch::new().dispatch(f)
    }
    #[cfg(not(feature = "simd"))]
    {
        f()
    }
}

#[inline(always)]
pub(crate) fn dispatch_if_large<R>(len: usize, f: impl FnOnce() -> R) -> R {
    if len >= DISPATCH_THRESHOLD {
        dispatch(f)
    } else {
        f()
    }
}

/// Per-element hook for the horizontal sum and dot reductions.
///
/// `None` means "use the lane accumulators in `reduce`". Integer types
/// always answer `None`, since their wrapping sums must match a sequential
/// fold bit for bit. With `simd`, f32 and f64 answer with a pulp kernel
/// whose result agrees with a left-to-right fold within `SUM_REL_TOL` /
/// `DOT_REL_TOL`. `fold_sumsq` is the dot of a buffer with itself.
pub trait MaybeSimdOps: Copy + Sized {
    fn try_simd_sum(_src: &[Self]) -> Option<Self> {
        None
    }
    fn try_simd_dot(_a: &[Self], _b: &[Self]) -> Option<Self> {
        None
    }
}

macro_rules! impl_no_simd {
    ($($t:ty),*) => {
        $(impl MaybeSimdOps for $t {})*
    };
}

impl_no_simd!(i8, i16, i32, i64, u8, u16, u32, u64);

#[cfg(not(feature = "simd"))]
impl_no_simd!(f32, f64);

#[cfg(feature = "simd")]
mod simd_impls {
    use super::MaybeSimdOps;
    use pulp::{Simd, WithSimd};

    struct Sum<'a, T>(&'a [T]);

    struct Dot<'a, T> {
        a: &'a [T],
        b: &'a [T],
    }

    // Four register accumulators combined pairwise, the same shape as the
    // portable `Accumulator` in `reduce`.
    macro_rules! impl_simd_float {
        ($t:ty, $as_simd:ident, $splat:ident, $add:ident, $mul_add:ident, $reduce:ident) => {
            impl<'a> WithSimd for Sum<'a, $t> {
                type Output = $t;

                #[inline(always)]
                fn with_simd<S: Simd>(self, simd: S) -> $t {
                    let (head, tail) = S::$as_simd(self.0);
                    let mut acc = [simd.$splat(0.0); 4];

                    let mut chunks = head.chunks_exact(4);
                    for c in &mut chunks {
                        acc[0] = simd.$add(acc[0], c[0]);
                        acc[1] = simd.$add(acc[1], c[1]);
                        acc[2] = simd.$add(acc[2], c[2]);
                        acc[3] = simd.$add(acc[3], c[3]);
                    }
                    for &v in chunks.remainder() {
                        acc[0] = simd.$add(acc[0], v);
                    }

                    let lanes = simd.$add(simd.$add(acc[0], acc[1]), simd.$add(acc[2], acc[3]));
                    tail.iter().fold(simd.$reduce(lanes), |s, &x| s + x)
                }
            }

            impl<'a> WithSimd for Dot<'a, $t> {
                type Output = $t;

                #[inline(always)]
                fn with_simd<S: Simd>(self, simd: S) -> $t {
                    let (a_head, a_tail) = S::$as_simd(self.a);
                    let (b_head, b_tail) = S::$as_simd(self.b);
                    debug_assert_eq!(a_head.len(), b_head.len());
                    let mut acc = [simd.$splat(0.0); 4];

                    let full = a_head.len() / 4 * 4;
                    for i in (0..full).step_by(4) {
                        acc[0] = simd.$mul_add(a_head[i], b_head[i], acc[0]);
                        acc[1] = simd.$mul_add(a_head[i + 1], b_head[i + 1], acc[1]);
                        acc[2] = simd.$mul_add(a_head[i + 2], b_head[i + 2], acc[2]);
                        acc[3] = simd.$mul_add(a_head[i + 3], b_head[i + 3], acc[3]);
                    }
                    for j in full..a_head.len() {
                        acc[0] = simd.$mul_add(a_head[j], b_head[j], acc[0]);
                    }

                    let lanes = simd.$add(simd.$add(acc[0], acc[1]), simd.$add(acc[2], acc[3]));
                    a_tail
                        .iter()
                        .zip(b_tail)
                        .fold(simd.$reduce(lanes), |s, (&x, &y)| s + x * y)
                }
            }

            impl MaybeSimdOps for $t {
                fn try_simd_sum(src: &[$t]) -> Option<$t> {
                    Some(pulp::Arch::new().dispatch(Sum(src)))
                }

                fn try_simd_dot(a: &[$t], b: &[$t]) -> Option<$t> {
                    if a.len() != b.len() {
                        return None;
                    }
                    Some(pulp::Arch::new().dispatch(Dot { a, b }))
                }
            }
        };
    }

    impl_simd_float!(f32, as_simd_f32s, splat_f32s, add_f32s, mul_add_f32s, reduce_sum_f32s);
    impl_simd_float!(f64, as_simd_f64s, splat_f64s, add_f64s, mul_add_f64s, reduce_sum_f64s);
}
