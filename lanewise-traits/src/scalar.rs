//! Narrower element bounds for kernels that only make sense on one family.

use crate::element::Element;

/// Floating-point elements (`f32`, `f64`).
///
/// Needed by kernels such as `sqrt` and by the statistics layer, which
/// computes in the element's own precision.
pub trait FloatElement: Element + num_traits::Float {
    /// Lossy conversion from `f64`.
    fn from_f64_lossy(value: f64) -> Self;
}

impl FloatElement for f32 {
    #[inline(always)]
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }
}

impl FloatElement for f64 {
    #[inline(always)]
    fn from_f64_lossy(value: f64) -> Self {
        value
    }
}

/// Primitive integer elements.
///
/// Used where a kernel needs exact integer spans, e.g. generating
/// `[start, end)` ranges.
pub trait IntElement: Element + num_traits::PrimInt {}

impl<T> IntElement for T where T: Element + num_traits::PrimInt {}
