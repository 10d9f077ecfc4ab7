//! Shared element traits for the lanewise workspace.
//!
//! This crate defines the contract every buffer element must satisfy to be
//! processed by `lanewise-kernel`: the lane width it occupies in a SIMD
//! register, its identities, and the fixed-width arithmetic the kernels use.
//!
//! External crates can depend on `lanewise-traits` alone to write code that
//! is generic over kernel element types.

pub mod element;
pub mod scalar;

pub use element::{Element, REGISTER_BYTES};
pub use scalar::{FloatElement, IntElement};
