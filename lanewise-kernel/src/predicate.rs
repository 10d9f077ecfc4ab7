//! Boolean predicates with block-level early exit.
//!
//! Each block produces a `K`-bit mask; the scan stops at the first block
//! whose mask decides the answer.

use lanewise_traits::Element;

use crate::reduce::{any_block, first_block};
use crate::{ensure_same_len, Result};

/// `true` when every element equals `value`; `true` for empty input.
pub fn all_eq<T: Element>(input: &[T], value: T) -> bool {
    !any_block::<T>(input.len(), |i| input[i] != value)
}

/// `true` when some element is greater than `value`; `false` for empty input.
pub fn any_gt<T: Element>(input: &[T], value: T) -> bool {
    any_block::<T>(input.len(), |i| input[i] > value)
}

/// `true` when `a[i] > b[i]` for every `i`.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn all_gt_zip<T: Element>(a: &[T], b: &[T]) -> Result<bool> {
    ensure_same_len(a.len(), b.len())?;
    Ok(!any_block::<T>(a.len(), |i| !(a[i] > b[i])))
}

/// `true` when `value` occurs in `input`.
pub fn contains<T: Element>(input: &[T], value: T) -> bool {
    any_block::<T>(input.len(), |i| input[i] == value)
}

/// Index of the first element equal to `value`.
pub fn find_index<T: Element>(input: &[T], value: T) -> Option<usize> {
    first_block::<T>(input.len(), |i| input[i] == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(all_eq::<i64>(&[], 3));
        assert!(!any_gt::<i64>(&[], 3));
        assert!(all_gt_zip::<f64>(&[], &[]).unwrap());
        assert!(!contains::<u8>(&[], 0));
        assert_eq!(find_index::<i32>(&[], 0), None);
    }

    #[test]
    fn test_all_eq_any_gt() {
        let mut v = vec![7i64; 37];
        assert!(all_eq(&v, 7));
        assert!(!any_gt(&v, 7));
        v[36] = 8;
        assert!(!all_eq(&v, 7));
        assert!(any_gt(&v, 7));
    }

    #[test]
    fn test_all_gt_zip() {
        let a = [5.0f32, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0];
        let mut b = [1.0f32; 9];
        assert!(all_gt_zip(&a, &b).unwrap());
        b[4] = 9.0;
        assert!(!all_gt_zip(&a, &b).unwrap());
        assert!(all_gt_zip(&a, &b[..2]).is_err());
        assert!(!all_gt_zip(&[f64::NAN], &[0.0]).unwrap());
    }

    #[test]
    fn test_find_index_first_match() {
        assert_eq!(find_index(&[1, 3, 7, 2], 7), Some(2));
        let v: Vec<u16> = (0..100).map(|i| i % 10).collect();
        assert_eq!(find_index(&v, 9), Some(9));
        assert_eq!(find_index(&v, 10), None);
        assert!(contains(&v, 4));
        assert!(!contains(&v, 11));
    }
}
