//! Permutation lookup tables for left-packing selected lanes.
//!
//! For a `K`-lane block and a `K`-bit selection mask `m`, row `m` of the
//! table lists the lane indices whose bit is set (ascending), followed by
//! the lane indices whose bit is clear (ascending):
//!
//! ```text
//!   K = 4, m = 0b1010:   row = [1, 3, 0, 2]
//!                               ^^^^  ^^^^
//!                               set   clear
//! ```
//!
//! Gathering a block through its row therefore left-packs the survivors in
//! their original order, and the first `popcount(m)` lanes of the result are
//! exactly the compacted block. The remaining lanes are the complement in
//! order, which is what [`partition`](crate::partition) stores on its fail
//! side.
//!
//! A table has `2^K` rows, so tables exist for groups of up to
//! [`MAX_LUT_LANES`] lanes. Wider blocks (16- and 8-bit elements) are
//! compacted one 8-lane group at a time using successive mask bytes.

use crate::MAX_LUT_LANES;

/// A `2^K`-row permutation table for `K`-lane groups.
#[derive(Debug)]
pub struct PermutationLut<const K: usize, const ROWS: usize> {
    rows: [[u8; K]; ROWS],
}

impl<const K: usize, const ROWS: usize> PermutationLut<K, ROWS> {
    /// Build the table at compile time.
    pub const fn build() -> Self {
        assert!(K <= MAX_LUT_LANES, "group wider than MAX_LUT_LANES");
        assert!(ROWS == 1 << K, "a K-lane table needs 2^K rows");

        let mut rows = [[0u8; K]; ROWS];
        let mut m = 0;
        while m < ROWS {
            let mut out = 0;
            let mut lane = 0;
            while lane < K {
                if (m >> lane) & 1 == 1 {
                    rows[m][out] = lane as u8;
                    out += 1;
                }
                lane += 1;
            }
            lane = 0;
            while lane < K {
                if (m >> lane) & 1 == 0 {
                    rows[m][out] = lane as u8;
                    out += 1;
                }
                lane += 1;
            }
            m += 1;
        }
        Self { rows }
    }

    #[inline(always)]
    pub const fn row(&self, mask: usize) -> &[u8; K] {
        &self.rows[mask]
    }

    pub const fn lanes(&self) -> usize {
        K
    }

    /// Check every row exhaustively: it is a permutation of `0..K`, the
    /// first `popcount(m)` entries are the set lanes ascending, and the rest
    /// are the clear lanes ascending.
    pub fn verify(&self) -> bool {
        self.rows.iter().enumerate().all(|(m, row)| {
            let survivors = (m as u32).count_ones() as usize;
            let (set, clear) = row.split_at(survivors);
            let mut seen = [false; MAX_LUT_LANES];
            for &lane in row {
                let lane = lane as usize;
                if lane >= K || seen[lane] {
                    return false;
                }
                seen[lane] = true;
            }
            set.iter().all(|&l| (m >> l) & 1 == 1)
                && clear.iter().all(|&l| (m >> l) & 1 == 0)
                && set.windows(2).all(|w| w[0] < w[1])
                && clear.windows(2).all(|w| w[0] < w[1])
        })
    }
}

pub static LUT1: PermutationLut<1, 2> = PermutationLut::build();
pub static LUT2: PermutationLut<2, 4> = PermutationLut::build();
pub static LUT4: PermutationLut<4, 16> = PermutationLut::build();
pub static LUT8: PermutationLut<8, 256> = PermutationLut::build();

/// Row `mask` of the table for `width`-lane groups.
///
/// # Panics
///
/// If `width` is not 1, 2, 4 or 8.
#[inline(always)]
pub fn row(width: usize, mask: u8) -> &'static [u8] {
    let m = mask as usize;
    match width {
        8 => &LUT8.row(m)[..],
        4 => &LUT4.row(m & 0xF)[..],
        2 => &LUT2.row(m & 0x3)[..],
        1 => &LUT1.row(m & 0x1)[..],
        _ => panic!("no permutation table for {width}-lane groups"),
    }
}

/// Group width used for a `k`-lane block.
#[inline(always)]
pub const fn group_width(k: usize) -> usize {
    if k < MAX_LUT_LANES {
        k
    } else {
        MAX_LUT_LANES
    }
}

/// The low `width` bits of `mask`.
#[inline(always)]
const fn group_bits(width: usize, mask: u8) -> u8 {
    if width >= 8 {
        mask
    } else {
        mask & ((1u8 << width) - 1)
    }
}

/// Gather `group` through the row for `mask` into a packed register.
#[inline(always)]
fn gather<T: Copy + Default>(group: &[T], mask: u8) -> [T; MAX_LUT_LANES] {
    debug_assert!(group.len().is_power_of_two() && group.len() <= MAX_LUT_LANES);
    let order = row(group.len(), mask);
    let mut packed = [T::default(); MAX_LUT_LANES];
    for (dst, &lane) in packed.iter_mut().zip(order) {
        *dst = group[lane as usize];
    }
    packed
}

/// Left-pack the lanes of `group` selected by `mask` to the front of `out`.
/// Mask bits above `group.len()` are ignored.
///
/// Returns the number of lanes written. `out` must hold `popcount(mask)`
/// elements.
#[inline(always)]
pub(crate) fn compress_into<T: Copy + Default>(out: &mut [T], group: &[T], mask: u8) -> usize {
    let mask = group_bits(group.len(), mask);
    let kept = mask.count_ones() as usize;
    if kept == 0 {
        return 0;
    }
    let packed = gather(group, mask);
    out[..kept].copy_from_slice(&packed[..kept]);
    kept
}

/// Split the lanes of `group` by `mask`: selected lanes to `pass`, the rest
/// to `fail`, both in their original order.
#[inline(always)]
pub(crate) fn compress_split<T: Copy + Default>(
    pass: &mut [T],
    fail: &mut [T],
    group: &[T],
    mask: u8,
) -> (usize, usize) {
    let mask = group_bits(group.len(), mask);
    let kept = mask.count_ones() as usize;
    let rejected = group.len() - kept;
    let packed = gather(group, mask);
    pass[..kept].copy_from_slice(&packed[..kept]);
    fail[..rejected].copy_from_slice(&packed[kept..group.len()]);
    (kept, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_verify() {
        assert!(LUT1.verify());
        assert!(LUT2.verify());
        assert!(LUT4.verify());
        assert!(LUT8.verify());
    }

    #[test]
    fn test_known_rows() {
        assert_eq!(LUT4.row(0b1010), &[1u8, 3, 0, 2]);
        assert_eq!(LUT4.row(0b0000), &[0u8, 1, 2, 3]);
        assert_eq!(LUT4.row(0b1111), &[0u8, 1, 2, 3]);
        assert_eq!(LUT8.row(0b1000_0001), &[0u8, 7, 1, 2, 3, 4, 5, 6]);
        assert_eq!(row(2, 0b10), &[1u8, 0]);
    }

    #[test]
    #[should_panic(expected = "no permutation table for 3-lane groups")]
    fn test_row_rejects_unsupported_width() {
        row(3, 0b101);
    }

    #[test]
    fn test_compress_masks_bits_above_group() {
        let group = [7u8, 8];
        let mut out = [0u8; 2];
        assert_eq!(compress_into(&mut out, &group, 0b1111_1110), 1);
        assert_eq!(out[0], 8);
    }

    #[test]
    fn test_group_width() {
        assert_eq!(group_width(4), 4);
        assert_eq!(group_width(8), 8);
        assert_eq!(group_width(32), 8);
        assert_eq!(LUT8.lanes(), 8);
    }

    #[test]
    fn test_compress_into() {
        let group = [10, 20, 30, 40];
        let mut out = [0; 4];
        assert_eq!(compress_into(&mut out, &group, 0b1010), 2);
        assert_eq!(&out[..2], &[20, 40]);
        assert_eq!(compress_into(&mut out, &group, 0), 0);
    }

    #[test]
    fn test_compress_split() {
        let group = [-2i32, 3, -1, 4];
        let (mut pass, mut fail) = ([0; 4], [0; 4]);
        let (p, f) = compress_split(&mut pass, &mut fail, &group, 0b1010);
        assert_eq!(&pass[..p], &[3, 4]);
        assert_eq!(&fail[..f], &[-2, -1]);
    }

    #[test]
    fn test_every_mask_of_eight_lanes() {
        let group: Vec<u16> = (100..108).collect();
        for mask in 0..=255u8 {
            let mut out = [0u16; 8];
            let n = compress_into(&mut out, &group, mask);
            let expected: Vec<u16> = (0..8)
                .filter(|l| (mask >> l) & 1 == 1)
                .map(|l| group[l])
                .collect();
            assert_eq!(&out[..n], expected.as_slice(), "mask {mask:#010b}");
        }
    }
}
