//! The numeric element contract shared by every kernel.
//!
//! An [`Element`] is a fixed-width number stored contiguously in a caller-owned
//! buffer. Its lane width `K` is derived purely from its byte size and the
//! target register width:
//!
//! ```text
//!   type      | bytes | LANES (256-bit register)
//! ------------|-------|-------------------------
//!   i8 / u8   |   1   |  32
//!   i16 / u16 |   2   |  16
//!   i32 / u32 |   4   |   8
//!   f32       |   4   |   8
//!   i64 / u64 |   8   |   4
//!   f64       |   8   |   4
//! ```
//!
//! Arithmetic is spelled `lane_*` so it never collides with `std::ops` or
//! `num_traits` methods when both are in scope.

use std::fmt::Debug;

/// Width of one SIMD register in bytes (256-bit AVX2-class register).
pub const REGISTER_BYTES: usize = 32;

/// A fixed-width numeric element that the lane kernels can process.
///
/// Integer arithmetic wraps in the element's own width (no overflow checks);
/// float arithmetic follows IEEE-754.
pub trait Element:
    Copy + PartialEq + PartialOrd + Default + Debug + Send + Sync + 'static
{
    /// Number of elements of this type that fit one register.
    const LANES: usize = REGISTER_BYTES / std::mem::size_of::<Self>();

    /// Number of bytes in the order-preserving radix key.
    const KEY_BYTES: usize = std::mem::size_of::<Self>();

    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;
    /// Smallest finite value.
    const MIN_VALUE: Self;
    /// Largest finite value.
    const MAX_VALUE: Self;
    /// Whether this is an IEEE floating-point type.
    const IS_FLOAT: bool;
    /// Whether the target ISA has a lane-parallel multiply for this width.
    ///
    /// `false` for 8-bit integers: multiplying kernels take the scalar tier.
    const NATIVE_MUL: bool = true;

    fn lane_add(self, rhs: Self) -> Self;
    fn lane_sub(self, rhs: Self) -> Self;
    fn lane_mul(self, rhs: Self) -> Self;

    /// Absolute value. `MIN` of a signed integer wraps to itself.
    fn lane_abs(self) -> Self;

    /// `|self - rhs|`, truncated to the element width for integers.
    fn lane_abs_diff(self, rhs: Self) -> Self;

    /// Larger of two values; floats ignore a NaN operand.
    fn lane_max(self, rhs: Self) -> Self;

    /// Smaller of two values; floats ignore a NaN operand.
    fn lane_min(self, rhs: Self) -> Self;

    /// Converts a count or index, wrapping for narrow integers.
    fn from_count(n: usize) -> Self;

    fn as_f64(self) -> f64;

    /// Order-preserving unsigned key: `a < b` iff `a.radix_key() < b.radix_key()`
    /// (floats use the IEEE total order). Only the low `KEY_BYTES` bytes vary.
    fn radix_key(self) -> u64;
}

// ---------------------------------------------------------------------------
// Signed integers
// ---------------------------------------------------------------------------

macro_rules! impl_element_signed {
    ($($t:ty => $u:ty, $native_mul:expr);* $(;)?) => {
        $(
            impl Element for $t {
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const MIN_VALUE: Self = <$t>::MIN;
                const MAX_VALUE: Self = <$t>::MAX;
                const IS_FLOAT: bool = false;
                const NATIVE_MUL: bool = $native_mul;

                #[inline(always)]
                fn lane_add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }
                #[inline(always)]
                fn lane_sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }
                #[inline(always)]
                fn lane_mul(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }
                #[inline(always)]
                fn lane_abs(self) -> Self {
                    self.wrapping_abs()
                }
                #[inline(always)]
                fn lane_abs_diff(self, rhs: Self) -> Self {
                    self.abs_diff(rhs) as $t
                }
                #[inline(always)]
                fn lane_max(self, rhs: Self) -> Self {
                    Ord::max(self, rhs)
                }
                #[inline(always)]
                fn lane_min(self, rhs: Self) -> Self {
                    Ord::min(self, rhs)
                }
                #[inline(always)]
                fn from_count(n: usize) -> Self {
                    n as $t
                }
                #[inline(always)]
                fn as_f64(self) -> f64 {
                    self as f64
                }
                #[inline(always)]
                fn radix_key(self) -> u64 {
                    ((self as $u) ^ (1 << (<$u>::BITS - 1))) as u64
                }
            }
        )*
    };
}

impl_element_signed!(
    i8 => u8, false;
    i16 => u16, true;
    i32 => u32, true;
    i64 => u64, true;
);

// ---------------------------------------------------------------------------
// Unsigned integers
// ---------------------------------------------------------------------------

macro_rules! impl_element_unsigned {
    ($($t:ty, $native_mul:expr);* $(;)?) => {
        $(
            impl Element for $t {
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const MIN_VALUE: Self = <$t>::MIN;
                const MAX_VALUE: Self = <$t>::MAX;
                const IS_FLOAT: bool = false;
                const NATIVE_MUL: bool = $native_mul;

                #[inline(always)]
                fn lane_add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }
                #[inline(always)]
                fn lane_sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }
                #[inline(always)]
                fn lane_mul(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }
                #[inline(always)]
                fn lane_abs(self) -> Self {
                    self
                }
                #[inline(always)]
                fn lane_abs_diff(self, rhs: Self) -> Self {
                    self.abs_diff(rhs)
                }
                #[inline(always)]
                fn lane_max(self, rhs: Self) -> Self {
                    Ord::max(self, rhs)
                }
                #[inline(always)]
                fn lane_min(self, rhs: Self) -> Self {
                    Ord::min(self, rhs)
                }
                #[inline(always)]
                fn from_count(n: usize) -> Self {
                    n as $t
                }
                #[inline(always)]
                fn as_f64(self) -> f64 {
                    self as f64
                }
                #[inline(always)]
                fn radix_key(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_element_unsigned!(
    u8, false;
    u16, true;
    u32, true;
    u64, true;
);

// ---------------------------------------------------------------------------
// Floats
// ---------------------------------------------------------------------------

macro_rules! impl_element_float {
    ($($t:ty => $bits:ty);* $(;)?) => {
        $(
            impl Element for $t {
                const ZERO: Self = 0.0;
                const ONE: Self = 1.0;
                const MIN_VALUE: Self = <$t>::MIN;
                const MAX_VALUE: Self = <$t>::MAX;
                const IS_FLOAT: bool = true;

                #[inline(always)]
                fn lane_add(self, rhs: Self) -> Self {
                    self + rhs
                }
                #[inline(always)]
                fn lane_sub(self, rhs: Self) -> Self {
                    self - rhs
                }
                #[inline(always)]
                fn lane_mul(self, rhs: Self) -> Self {
                    self * rhs
                }
                #[inline(always)]
                fn lane_abs(self) -> Self {
                    self.abs()
                }
                #[inline(always)]
                fn lane_abs_diff(self, rhs: Self) -> Self {
                    (self - rhs).abs()
                }
                #[inline(always)]
                fn lane_max(self, rhs: Self) -> Self {
                    self.max(rhs)
                }
                #[inline(always)]
                fn lane_min(self, rhs: Self) -> Self {
                    self.min(rhs)
                }
                #[inline(always)]
                fn from_count(n: usize) -> Self {
                    n as $t
                }
                #[inline(always)]
                fn as_f64(self) -> f64 {
                    self as f64
                }
                #[inline(always)]
                fn radix_key(self) -> u64 {
                    const SIGN: $bits = 1 << (<$bits>::BITS - 1);
                    let bits = self.to_bits();
                    let key = if bits & SIGN != 0 { !bits } else { bits | SIGN };
                    key as u64
                }
            }
        )*
    };
}

impl_element_float!(
    f32 => u32;
    f64 => u64;
);
