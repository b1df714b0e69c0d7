//! Elementwise bitwise combination of same-shape grids.
//!
//! # Masked operations
//!
//! The `*_masked_into` functions write into an explicit destination. The mask
//! is a single-channel grid with the operands' width and height. Wherever the
//! mask is non-zero, every channel of the destination pixel is overwritten
//! with the operator's result; wherever the mask is zero, the destination
//! keeps the value it already had. The `*_masked` functions without a
//! destination start from a zero-filled grid, so unmasked pixels read 0.

use crate::image::PixelGrid;
use crate::util::par::for_each_row;
use crate::util::{SieveError, SieveResult};

/// Binary bitwise operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

impl BitwiseOp {
    #[inline]
    fn eval(self, a: u8, b: u8) -> u8 {
        match self {
            BitwiseOp::And => a & b,
            BitwiseOp::Or => a | b,
            BitwiseOp::Xor => a ^ b,
        }
    }
}

/// Elementwise AND.
pub fn and(a: &PixelGrid, b: &PixelGrid) -> SieveResult<PixelGrid> {
    combine(BitwiseOp::And, a, b)
}

/// Elementwise OR.
pub fn or(a: &PixelGrid, b: &PixelGrid) -> SieveResult<PixelGrid> {
    combine(BitwiseOp::Or, a, b)
}

/// Elementwise XOR.
pub fn xor(a: &PixelGrid, b: &PixelGrid) -> SieveResult<PixelGrid> {
    combine(BitwiseOp::Xor, a, b)
}

/// Elementwise complement (`255 - v`).
pub fn not(a: &PixelGrid) -> PixelGrid {
    let row_len = a.width() * a.channels();
    let src = a.data();
    let mut out = vec![0u8; src.len()];
    for_each_row(&mut out, row_len, |y, row| {
        let src_row = &src[y * row_len..(y + 1) * row_len];
        for (dst, &v) in row.iter_mut().zip(src_row) {
            *dst = !v;
        }
    });
    like(a, out)
}

/// Applies `op` to every sample pair.
pub fn combine(op: BitwiseOp, a: &PixelGrid, b: &PixelGrid) -> SieveResult<PixelGrid> {
    a.ensure_same_shape(b)?;
    let row_len = a.width() * a.channels();
    let (lhs, rhs) = (a.data(), b.data());
    let mut out = vec![0u8; lhs.len()];
    for_each_row(&mut out, row_len, |y, row| {
        let range = y * row_len..(y + 1) * row_len;
        for ((dst, &l), &r) in row.iter_mut().zip(&lhs[range.clone()]).zip(&rhs[range]) {
            *dst = op.eval(l, r);
        }
    });
    Ok(like(a, out))
}

/// Writes `op(a, b)` into `dst` where `mask != 0`; other pixels are untouched.
pub fn combine_masked_into(
    op: BitwiseOp,
    a: &PixelGrid,
    b: &PixelGrid,
    mask: &PixelGrid,
    dst: &mut PixelGrid,
) -> SieveResult<()> {
    a.ensure_same_shape(b)?;
    ensure_mask(a, mask)?;
    a.ensure_same_shape(dst)?;
    let channels = a.channels();
    let row_len = a.width() * channels;
    let (lhs, rhs, mask) = (a.data(), b.data(), mask.data());
    let width = a.width();
    for_each_row(dst.data_mut(), row_len, |y, row| {
        let mask_row = &mask[y * width..(y + 1) * width];
        let base = y * row_len;
        for (x, px) in row.chunks_exact_mut(channels).enumerate() {
            if mask_row[x] == 0 {
                continue;
            }
            let start = base + x * channels;
            for (c, dst) in px.iter_mut().enumerate() {
                *dst = op.eval(lhs[start + c], rhs[start + c]);
            }
        }
    });
    Ok(())
}

/// `combine_masked_into` with a zero-filled destination.
pub fn combine_masked(
    op: BitwiseOp,
    a: &PixelGrid,
    b: &PixelGrid,
    mask: &PixelGrid,
) -> SieveResult<PixelGrid> {
    let mut dst = like(a, vec![0u8; a.data().len()]);
    combine_masked_into(op, a, b, mask, &mut dst)?;
    Ok(dst)
}

/// Writes `!a` into `dst` where `mask != 0`; other pixels are untouched.
pub fn not_masked_into(a: &PixelGrid, mask: &PixelGrid, dst: &mut PixelGrid) -> SieveResult<()> {
    ensure_mask(a, mask)?;
    a.ensure_same_shape(dst)?;
    let channels = a.channels();
    let row_len = a.width() * channels;
    let width = a.width();
    let (src, mask) = (a.data(), mask.data());
    for_each_row(dst.data_mut(), row_len, |y, row| {
        let mask_row = &mask[y * width..(y + 1) * width];
        let base = y * row_len;
        for (x, px) in row.chunks_exact_mut(channels).enumerate() {
            if mask_row[x] == 0 {
                continue;
            }
            let start = base + x * channels;
            for (c, dst) in px.iter_mut().enumerate() {
                *dst = !src[start + c];
            }
        }
    });
    Ok(())
}

/// `not_masked_into` with a zero-filled destination.
pub fn not_masked(a: &PixelGrid, mask: &PixelGrid) -> SieveResult<PixelGrid> {
    let mut dst = like(a, vec![0u8; a.data().len()]);
    not_masked_into(a, mask, &mut dst)?;
    Ok(dst)
}

fn ensure_mask(a: &PixelGrid, mask: &PixelGrid) -> SieveResult<()> {
    if mask.channels() != 1 {
        return Err(SieveError::UnsupportedChannelLayout {
            channels: mask.channels(),
        });
    }
    if mask.shape() != a.shape() {
        let (width, height) = a.shape();
        return Err(SieveError::mismatch(
            (mask.width(), mask.height(), 1),
            (width, height, 1),
        ));
    }
    Ok(())
}

fn like(a: &PixelGrid, data: Vec<u8>) -> PixelGrid {
    PixelGrid::from_parts(data, a.width(), a.height(), a.channels(), a.order())
}
