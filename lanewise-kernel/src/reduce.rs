//! Horizontal-reduction engine.
//!
//! A reduction keeps [`UNROLL`] independent `K`-lane accumulator chains so
//! that consecutive blocks never wait on each other. At the end the chains
//! are combined pairwise, and the surviving `K` lanes are collapsed by a
//! halving shuffle-and-combine tree:
//!
//! ```text
//!   chains:  c0  c1  c2  c3        (each [T; K])
//!             \  /    \  /
//!             c01     c23
//!               \     /
//!                lanes             [T; K]
//!   tree:   [a b c d e f g h] -> [a+e b+f c+g d+h] -> [.. ..] -> [total]
//! ```
//!
//! The scalar tail folds into a separate accumulator that is combined last.
//! Every accumulator starts from the same seed, so the seed must be the
//! identity of the operation (sum, product) or a value already in the input
//! (max, min).

use std::ops::ControlFlow;

use lanewise_traits::Element;

use crate::lanes::{dispatch_lanes, drive, drive_until, Step, WithLanes};
use crate::simd::{dispatch_if_large, MaybeSimdOps};
use crate::{ensure_same_len, Result, UNROLL};

/// `UNROLL` independent `K`-lane accumulator chains.
#[derive(Debug, Clone, Copy)]
pub struct Accumulator<T, const K: usize> {
    chains: [[T; K]; UNROLL],
}

impl<T: Copy, const K: usize> Accumulator<T, K> {
    /// All lanes of all chains set to `seed`.
    #[inline(always)]
    pub fn splat(seed: T) -> Self {
        Self {
            chains: [[seed; K]; UNROLL],
        }
    }

    /// Combine one block into chain `chain % UNROLL`.
    #[inline(always)]
    pub fn absorb<F: Fn(T, T) -> T>(&mut self, chain: usize, block: [T; K], op: F) {
        let acc = &mut self.chains[chain % UNROLL];
        for (a, v) in acc.iter_mut().zip(block) {
            *a = op(*a, v);
        }
    }

    /// Combine the chains pairwise, then reduce the lanes horizontally.
    #[inline(always)]
    pub fn finish<F: Fn(T, T) -> T>(self, op: F) -> T {
        let [c0, c1, c2, c3] = self.chains;
        let c01: [T; K] = std::array::from_fn(|l| op(c0[l], c1[l]));
        let c23: [T; K] = std::array::from_fn(|l| op(c2[l], c3[l]));
        let lanes: [T; K] = std::array::from_fn(|l| op(c01[l], c23[l]));
        horizontal(lanes, op)
    }
}

/// Collapse `K` lanes to one value by repeatedly combining the upper half
/// into the lower half.
#[inline(always)]
pub fn horizontal<T: Copy, const K: usize, F: Fn(T, T) -> T>(lanes: [T; K], op: F) -> T {
    let mut v = lanes;
    let mut width = K;
    while width > 1 {
        let half = width / 2;
        for l in 0..half {
            v[l] = op(v[l], v[l + half]);
        }
        if width % 2 == 1 {
            v[0] = op(v[0], v[width - 1]);
        }
        width = half;
    }
    v[0]
}

// ----------------------------------------------------------------------------
// Generic fold driver
// ----------------------------------------------------------------------------

/// Fold `value(i)` for `i in 0..n` with the lane width of `L`.
struct Fold<L, A, V, C> {
    n: usize,
    seed: A,
    value: V,
    combine: C,
    _lanes: std::marker::PhantomData<L>,
}

impl<L, A, V, C> WithLanes for Fold<L, A, V, C>
where
    A: Copy,
    V: Fn(usize) -> A,
    C: Fn(A, A) -> A,
{
    type Output = A;

    #[inline(always)]
    fn with_lanes<const K: usize>(self) -> A {
        let Fold {
            n,
            seed,
            value,
            combine,
            ..
        } = self;
        let mut acc = Accumulator::<A, K>::splat(seed);
        let mut tail = seed;
        drive::<K>(n, |step| match step {
            Step::Scalar(j) => tail = combine(tail, value(j)),
            Step::Wide(_) => {
                for (chain, s) in step.blocks::<K>().enumerate() {
                    acc.absorb(chain, std::array::from_fn(|l| value(s + l)), &combine);
                }
            }
            Step::Block(s) => {
                acc.absorb(s / K, std::array::from_fn(|l| value(s + l)), &combine);
            }
        });
        combine(acc.finish(&combine), tail)
    }
}

#[inline(always)]
pub(crate) fn fold_lanes<L: Element, A: Copy>(
    n: usize,
    seed: A,
    value: impl Fn(usize) -> A,
    combine: impl Fn(A, A) -> A,
) -> A {
    dispatch_if_large(n, || {
        dispatch_lanes::<L, _>(Fold {
            n,
            seed,
            value,
            combine,
            _lanes: std::marker::PhantomData::<L>,
        })
    })
}

// ----------------------------------------------------------------------------
// Reductions
// ----------------------------------------------------------------------------

/// Sum of all elements; 0 for empty input.
///
/// Integers wrap in the element type. Float results agree with the scalar
/// left fold within [`SUM_REL_TOL`](crate::SUM_REL_TOL) for f64 and
/// [`F32_REL_TOL`](crate::F32_REL_TOL) for f32.
pub fn reduce_add<T: Element + MaybeSimdOps>(input: &[T]) -> T {
    log::trace!("reduce_add<{}>: n={}", std::any::type_name::<T>(), input.len());
    if let Some(sum) = T::try_simd_sum(input) {
        return sum;
    }
    fold_lanes::<T, T>(input.len(), T::ZERO, |i| input[i], T::lane_add)
}

/// Product of all elements; 1 for empty input.
pub fn reduce_mul<T: Element>(input: &[T]) -> T {
    log::trace!("reduce_mul<{}>: n={}", std::any::type_name::<T>(), input.len());
    fold_lanes::<T, T>(input.len(), T::ONE, |i| input[i], T::lane_mul)
}

/// Largest element, or `None` for empty input.
///
/// Every lane is seeded with `input[0]`, so the result equals the scalar
/// `fold(input[0], max)`. Float NaNs are ignored unless every element is NaN.
pub fn reduce_max<T: Element>(input: &[T]) -> Option<T> {
    let &first = input.first()?;
    log::trace!("reduce_max<{}>: n={}", std::any::type_name::<T>(), input.len());
    Some(fold_lanes::<T, T>(
        input.len(),
        first,
        |i| input[i],
        T::lane_max,
    ))
}

/// Smallest element, or `None` for empty input. See [`reduce_max`].
pub fn reduce_min<T: Element>(input: &[T]) -> Option<T> {
    let &first = input.first()?;
    log::trace!("reduce_min<{}>: n={}", std::any::type_name::<T>(), input.len());
    Some(fold_lanes::<T, T>(
        input.len(),
        first,
        |i| input[i],
        T::lane_min,
    ))
}

/// `sum(a[i] * b[i])`; 0 for empty input.
pub fn fold_dot<T: Element + MaybeSimdOps>(a: &[T], b: &[T]) -> Result<T> {
    ensure_same_len(a.len(), b.len())?;
    log::trace!("fold_dot<{}>: n={}", std::any::type_name::<T>(), a.len());
    if let Some(dot) = T::try_simd_dot(a, b) {
        return Ok(dot);
    }
    Ok(fold_lanes::<T, T>(
        a.len(),
        T::ZERO,
        |i| a[i].lane_mul(b[i]),
        T::lane_add,
    ))
}

/// `sum(x[i]^2)`; 0 for empty input.
pub fn fold_sumsq<T: Element + MaybeSimdOps>(input: &[T]) -> T {
    log::trace!("fold_sumsq<{}>: n={}", std::any::type_name::<T>(), input.len());
    if let Some(sq) = T::try_simd_dot(input, input) {
        return sq;
    }
    fold_lanes::<T, T>(
        input.len(),
        T::ZERO,
        |i| input[i].lane_mul(input[i]),
        T::lane_add,
    )
}

/// Sum of absolute differences `sum(|a[i] - b[i]|)`; 0 for empty input.
pub fn fold_sad<T: Element>(a: &[T], b: &[T]) -> Result<T> {
    ensure_same_len(a.len(), b.len())?;
    log::trace!("fold_sad<{}>: n={}", std::any::type_name::<T>(), a.len());
    Ok(fold_lanes::<T, T>(
        a.len(),
        T::ZERO,
        |i| a[i].lane_abs_diff(b[i]),
        T::lane_add,
    ))
}

/// General left fold, strictly in index order.
pub fn foldl<T: Copy, A, F: FnMut(A, T) -> A>(input: &[T], init: A, f: F) -> A {
    input.iter().copied().fold(init, f)
}

/// `true` when every element is non-zero; `true` for empty input.
pub fn reduce_and<T: Element>(input: &[T]) -> bool {
    !any_block::<T>(input.len(), |i| input[i] == T::ZERO)
}

/// `true` when any element is non-zero; `false` for empty input.
pub fn reduce_or<T: Element>(input: &[T]) -> bool {
    any_block::<T>(input.len(), |i| input[i] != T::ZERO)
}

/// Number of elements equal to `value`.
pub fn count_eq<T: Element>(input: &[T], value: T) -> usize {
    log::trace!("count_eq<{}>: n={}", std::any::type_name::<T>(), input.len());
    fold_lanes::<T, usize>(
        input.len(),
        0,
        |i| usize::from(input[i] == value),
        |a, b| a + b,
    )
}

/// Whether `hit(i)` holds for some `i`.
pub(crate) fn any_block<T: Element>(n: usize, hit: impl Fn(usize) -> bool) -> bool {
    first_block::<T>(n, hit).is_some()
}

/// First `i` for which `hit(i)` holds, scanning block masks in order.
pub(crate) fn first_block<T: Element>(n: usize, hit: impl Fn(usize) -> bool) -> Option<usize> {
    struct FirstHit<F> {
        n: usize,
        hit: F,
    }

    impl<F: Fn(usize) -> bool> WithLanes for FirstHit<F> {
        type Output = Option<usize>;

        #[inline(always)]
        fn with_lanes<const K: usize>(self) -> Option<usize> {
            let FirstHit { n, hit } = self;
            drive_until::<K, usize>(n, |step| match step {
                Step::Scalar(j) if hit(j) => ControlFlow::Break(j),
                Step::Scalar(_) => ControlFlow::Continue(()),
                _ => {
                    for s in step.blocks::<K>() {
                        let mask = (0..K).fold(0u32, |m, l| m | (u32::from(hit(s + l)) << l));
                        if mask != 0 {
                            return ControlFlow::Break(s + mask.trailing_zeros() as usize);
                        }
                    }
                    ControlFlow::Continue(())
                }
            })
        }
    }

    dispatch_if_large(n, || dispatch_lanes::<T, _>(FirstHit { n, hit }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KernelError, SUM_REL_TOL};
    use approx::assert_relative_eq;

    #[test]
    fn test_horizontal_tree() {
        assert_eq!(horizontal([1, 2, 3, 4, 5, 6, 7, 8], |a, b| a + b), 36);
        assert_eq!(horizontal([5], |a: i32, b| a.max(b)), 5);
        assert_eq!(horizontal([1, 2, 3], |a, b| a + b), 6);
    }

    #[test]
    fn test_accumulator_combines_all_chains() {
        let mut acc = Accumulator::<i32, 4>::splat(0);
        for chain in 0..6 {
            acc.absorb(chain, [1, 2, 3, 4], |a, b| a + b);
        }
        assert_eq!(acc.finish(|a, b| a + b), 60);
    }

    #[test]
    fn test_reduce_add_identities() {
        assert_eq!(reduce_add::<i64>(&[]), 0);
        assert_eq!(reduce_add::<f32>(&[]), 0.0);
        assert_eq!(reduce_mul::<u32>(&[]), 1);
        assert_eq!(fold_dot::<f64>(&[], &[]).unwrap(), 0.0);
        assert_eq!(fold_sumsq::<i16>(&[]), 0);
    }

    #[test]
    fn test_reduce_add_boundaries() {
        for n in [0usize, 1, 3, 4, 5, 15, 16, 17, 100, 1001] {
            let input: Vec<i64> = (0..n as i64).collect();
            let expected: i64 = input.iter().sum();
            assert_eq!(reduce_add(&input), expected, "n={n}");

            let floats: Vec<f64> = input.iter().map(|&x| x as f64 * 0.1).collect();
            let scalar = floats.iter().fold(0.0, |a, &b| a + b);
            assert_relative_eq!(reduce_add(&floats), scalar, max_relative = SUM_REL_TOL);
        }
    }

    #[test]
    fn test_integer_sum_wraps() {
        let input = vec![100i8; 70];
        let expected = input.iter().fold(0i8, |a, &b| a.wrapping_add(b));
        assert_eq!(reduce_add(&input), expected);
    }

    #[test]
    fn test_max_min() {
        assert_eq!(reduce_max::<i32>(&[]), None);
        assert_eq!(reduce_min::<f64>(&[]), None);
        assert_eq!(reduce_max(&[3, 9, -2, 7, 9, 1]), Some(9));
        assert_eq!(reduce_min(&[3u8, 9, 2, 7, 200, 1, 5, 5, 5]), Some(1));

        let neg_inf = vec![f64::NEG_INFINITY; 11];
        assert_eq!(reduce_max(&neg_inf), Some(f64::NEG_INFINITY));

        let mut with_nan: Vec<f32> = (0..20).map(|i| i as f32).collect();
        with_nan[0] = f32::NAN;
        with_nan[7] = f32::NAN;
        assert_eq!(reduce_max(&with_nan), Some(19.0));
        assert_eq!(reduce_min(&with_nan), Some(1.0));
        assert!(reduce_max(&[f64::NAN, f64::NAN]).unwrap().is_nan());
    }

    #[test]
    fn test_dot_sad_sumsq() {
        let a: Vec<i32> = (1..=10).collect();
        let b: Vec<i32> = (1..=10).rev().collect();
        assert_eq!(fold_dot(&a, &b).unwrap(), 220);
        assert_eq!(fold_sad(&a, &b).unwrap(), 50);
        assert_eq!(fold_sumsq(&a), 385);
        assert_eq!(
            fold_dot(&a, &b[..3]),
            Err(KernelError::LengthMismatch {
                expected: 10,
                actual: 3
            })
        );
    }

    #[test]
    fn test_product_and_foldl() {
        assert_eq!(reduce_mul(&[1.5f64, 2.0, 4.0]), 12.0);
        assert_eq!(reduce_mul(&[2u64; 10]), 1024);
        let s = foldl(&[1, 2, 3], String::new(), |acc, x: i32| acc + &x.to_string());
        assert_eq!(s, "123");
    }

    #[test]
    fn test_and_or_count() {
        assert!(reduce_and::<i32>(&[]));
        assert!(!reduce_or::<i32>(&[]));
        let mut v = vec![1u16; 40];
        assert!(reduce_and(&v));
        v[37] = 0;
        assert!(!reduce_and(&v));
        assert!(reduce_or(&v));
        assert!(!reduce_or(&[0i64; 9]));
        assert_eq!(count_eq(&[1, 2, 1, 1, 3, 1, 0, 1, 1], 1), 6);
    }

    #[test]
    fn test_first_block_finds_lowest_index() {
        let v: Vec<i32> = (0..50).collect();
        assert_eq!(first_block::<i32>(v.len(), |i| v[i] > 20), Some(21));
        assert_eq!(first_block::<i32>(v.len(), |i| v[i] == 49), Some(49));
        assert_eq!(first_block::<i32>(v.len(), |i| v[i] < 0), None);
    }
}
