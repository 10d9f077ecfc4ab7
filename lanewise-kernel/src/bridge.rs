//! Generic dispatch bridge for values that are not numeric elements.
//!
//! Application code uses these when no specialised kernel exists for its
//! type: scene objects, light records, anything with a fixed layout. Two
//! flavours are provided:
//!
//! - typed: `&[T]` slices plus a closure and a borrowed context `&C`;
//! - strided: raw byte buffers with an explicit element stride, for records
//!   whose layout is only known at runtime.
//!
//! Typed maps reuse the lane/tail dispatcher with a lane count derived from
//! `size_of::<T>()`; the per-element closure still runs once per index in
//! order.

use std::mem::size_of;

use crate::lanes::{dispatch_width, drive, lanes_for_size, Step, WithLanes};
use crate::{ensure_capacity, ensure_same_len, KernelError, Result};

// ----------------------------------------------------------------------------
// Typed structs
// ----------------------------------------------------------------------------

struct MapStructs<'a, T, U, C: ?Sized, F> {
    out: &'a mut [U],
    input: &'a [T],
    ctx: &'a C,
    f: F,
}

impl<T, U, C: ?Sized, F: Fn(&T, &C) -> U> WithLanes for MapStructs<'_, T, U, C, F> {
    type Output = ();

    #[inline(always)]
    fn with_lanes<const K: usize>(self) {
        let MapStructs { out, input, ctx, f } = self;
        drive::<K>(input.len(), |step| match step {
            Step::Scalar(j) => out[j] = f(&input[j], ctx),
            _ => {
                for s in step.blocks::<K>() {
                    for (o, x) in out[s..s + K].iter_mut().zip(&input[s..s + K]) {
                        *o = f(x, ctx);
                    }
                }
            }
        });
    }
}

/// `out[i] = f(&input[i], ctx)`.
pub fn map_structs<T, U, C, F>(out: &mut [U], input: &[T], ctx: &C, f: F) -> Result<()>
where
    C: ?Sized,
    F: Fn(&T, &C) -> U,
{
    ensure_same_len(input.len(), out.len())?;
    let lanes = lanes_for_size(size_of::<T>());
    log::trace!(
        "map_structs<{}>: n={} lanes={}",
        std::any::type_name::<T>(),
        input.len(),
        lanes
    );
    dispatch_width(lanes, MapStructs { out, input, ctx, f });
    Ok(())
}

/// `out[i] = f(&a[i], &b[i], ctx)`.
pub fn zip_structs<A, B, U, C, F>(out: &mut [U], a: &[A], b: &[B], ctx: &C, f: F) -> Result<()>
where
    C: ?Sized,
    F: Fn(&A, &B, &C) -> U,
{
    ensure_same_len(a.len(), b.len())?;
    ensure_same_len(a.len(), out.len())?;
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = f(x, y, ctx);
    }
    Ok(())
}

/// `out[i] = f(g(input[i]))`, staging the intermediate values in `scratch`.
pub fn compose_structs<T, M, U, CG, CF, G, F>(
    out: &mut [U],
    scratch: &mut [M],
    input: &[T],
    (g, ctx_g): (G, &CG),
    (f, ctx_f): (F, &CF),
) -> Result<()>
where
    CG: ?Sized,
    CF: ?Sized,
    G: Fn(&T, &CG) -> M,
    F: Fn(&M, &CF) -> U,
{
    ensure_same_len(input.len(), scratch.len())?;
    map_structs(scratch, input, ctx_g, g)?;
    map_structs(out, scratch, ctx_f, f)
}

/// Update every item in place.
pub fn for_each_struct<T, C, F>(items: &mut [T], ctx: &C, f: F)
where
    C: ?Sized,
    F: Fn(&mut T, &C),
{
    for item in items.iter_mut() {
        f(item, ctx);
    }
}

/// Left fold over `input` with a borrowed context.
pub fn fold_structs<T, A, C, F>(input: &[T], init: A, ctx: &C, f: F) -> A
where
    C: ?Sized,
    F: Fn(A, &T, &C) -> A,
{
    input.iter().fold(init, |acc, x| f(acc, x, ctx))
}

/// Clone the items satisfying `pred` to the front of `out`, in order.
/// `out` must hold `input.len()` items.
pub fn filter_structs<T, C, P>(out: &mut [T], input: &[T], ctx: &C, pred: P) -> Result<usize>
where
    T: Clone,
    C: ?Sized,
    P: Fn(&T, &C) -> bool,
{
    ensure_capacity(input.len(), out.len())?;
    let mut kept = 0;
    for x in input.iter().filter(|x| pred(x, ctx)) {
        out[kept] = x.clone();
        kept += 1;
    }
    Ok(kept)
}

/// Split `input` by `pred` into `pass` and `fail`, both order-preserving.
pub fn partition_structs<T, C, P>(
    pass: &mut [T],
    fail: &mut [T],
    input: &[T],
    ctx: &C,
    pred: P,
) -> Result<(usize, usize)>
where
    T: Clone,
    C: ?Sized,
    P: Fn(&T, &C) -> bool,
{
    ensure_capacity(input.len(), pass.len())?;
    ensure_capacity(input.len(), fail.len())?;
    let (mut p, mut f) = (0, 0);
    for x in input {
        if pred(x, ctx) {
            pass[p] = x.clone();
            p += 1;
        } else {
            fail[f] = x.clone();
            f += 1;
        }
    }
    Ok((p, f))
}

/// First item satisfying `pred`.
pub fn find_struct<'a, T, C, P>(input: &'a [T], ctx: &C, pred: P) -> Option<&'a T>
where
    C: ?Sized,
    P: Fn(&T, &C) -> bool,
{
    input.iter().find(|x| pred(x, ctx))
}

// ----------------------------------------------------------------------------
// Strided byte buffers
// ----------------------------------------------------------------------------

/// Number of `stride`-byte records in a buffer of `len` bytes.
fn record_count(len: usize, stride: usize) -> Result<usize> {
    if stride == 0 || len % stride != 0 {
        return Err(KernelError::InvalidElementSize {
            elem_size: stride,
            len,
        });
    }
    Ok(len / stride)
}

/// Map `in_stride`-byte records of `input` to `out_stride`-byte records of
/// `out`: `f(out_record, in_record, ctx)`. Returns the record count.
pub fn map_strided<C, F>(
    out: &mut [u8],
    input: &[u8],
    (in_stride, out_stride): (usize, usize),
    ctx: &C,
    f: F,
) -> Result<usize>
where
    C: ?Sized,
    F: Fn(&mut [u8], &[u8], &C),
{
    let n = record_count(input.len(), in_stride)?;
    let m = record_count(out.len(), out_stride)?;
    ensure_same_len(n, m)?;
    log::trace!("map_strided: n={n} in_stride={in_stride} out_stride={out_stride}");
    for (o, x) in out.chunks_exact_mut(out_stride).zip(input.chunks_exact(in_stride)) {
        f(o, x, ctx);
    }
    Ok(n)
}

/// Left fold over `stride`-byte records.
pub fn fold_strided<A, C, F>(input: &[u8], stride: usize, init: A, ctx: &C, f: F) -> Result<A>
where
    C: ?Sized,
    F: Fn(A, &[u8], &C) -> A,
{
    record_count(input.len(), stride)?;
    Ok(input
        .chunks_exact(stride)
        .fold(init, |acc, record| f(acc, record, ctx)))
}

/// Copy the `stride`-byte records satisfying `pred` to the front of `out`.
/// Returns the number of records kept. `out` must be as long as `input`.
pub fn filter_strided<C, P>(
    out: &mut [u8],
    input: &[u8],
    stride: usize,
    ctx: &C,
    pred: P,
) -> Result<usize>
where
    C: ?Sized,
    P: Fn(&[u8], &C) -> bool,
{
    record_count(input.len(), stride)?;
    ensure_capacity(input.len(), out.len())?;
    let mut kept = 0;
    for record in input.chunks_exact(stride).filter(|r| pred(r, ctx)) {
        out[kept * stride..(kept + 1) * stride].copy_from_slice(record);
        kept += 1;
    }
    Ok(kept)
}
