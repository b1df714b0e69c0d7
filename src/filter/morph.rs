//! Binary morphology with a structuring element.
//!
//! Erosion takes the minimum over the element's footprint and dilation the
//! maximum over the reflected footprint; on binary grids these are the
//! logical AND and OR of the neighbourhood. Samples outside the grid count as
//! background (0).
//!
//! Opening and closing are evaluated on a canvas padded with background by
//! the element size and cropped back afterwards. The grid therefore behaves
//! as if it were embedded in an infinite background plane, which keeps
//! `open(x) <= x <= close(x)` and the idempotence of both operators intact at
//! the borders.

use crate::image::{ImageView, PixelGrid};
use crate::util::math::offset_index;
use crate::util::par::for_each_row;
use crate::util::{SieveError, SieveResult};

/// Boolean kernel with an anchor point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuringElement {
    width: usize,
    height: usize,
    mask: Vec<bool>,
    anchor: (usize, usize),
}

impl StructuringElement {
    /// Creates an element from a row-major mask and an anchor `(x, y)`.
    pub fn new(
        mask: Vec<bool>,
        width: usize,
        height: usize,
        anchor: (usize, usize),
    ) -> SieveResult<Self> {
        if width == 0 || height == 0 {
            return Err(SieveError::InvalidParameter {
                name: "structuring_element",
                reason: "kernel size must be non-zero",
            });
        }
        if mask.len() != width * height {
            return Err(SieveError::InvalidParameter {
                name: "structuring_element",
                reason: "mask length must equal width * height",
            });
        }
        if !mask.iter().any(|&on| on) {
            return Err(SieveError::InvalidParameter {
                name: "structuring_element",
                reason: "kernel has no active cells",
            });
        }
        if anchor.0 >= width || anchor.1 >= height {
            return Err(SieveError::InvalidParameter {
                name: "anchor",
                reason: "anchor must lie inside the kernel",
            });
        }
        Ok(Self {
            width,
            height,
            mask,
            anchor,
        })
    }

    /// Full rectangle anchored at its centre.
    pub fn rect(width: usize, height: usize) -> SieveResult<Self> {
        Self::new(vec![true; width * height], width, height, (width / 2, height / 2))
    }

    /// Square `size x size` element anchored at its centre.
    pub fn square(size: usize) -> SieveResult<Self> {
        Self::rect(size, size)
    }

    /// Plus-shaped element anchored at its centre.
    pub fn cross(size: usize) -> SieveResult<Self> {
        let mid = size / 2;
        let mask = (0..size * size)
            .map(|i| i % size == mid || i / size == mid)
            .collect();
        Self::new(mask, size, size, (mid, mid))
    }

    /// Returns the kernel width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the kernel height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the anchor `(x, y)`.
    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }

    /// Offsets of the active cells relative to the anchor.
    fn offsets(&self) -> Vec<(isize, isize)> {
        let (ax, ay) = self.anchor;
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, &on)| on)
            .map(|(i, _)| {
                let kx = (i % self.width) as isize - ax as isize;
                let ky = (i / self.width) as isize - ay as isize;
                (kx, ky)
            })
            .collect()
    }
}

/// Morphological operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphOp {
    Erode,
    Dilate,
    /// Erosion followed by dilation; removes small foreground specks.
    Open,
    /// Dilation followed by erosion; fills small background gaps.
    Close,
}

impl MorphOp {
    /// Name of the buffer this operator produces in a pipeline run.
    pub fn output_name(self) -> &'static str {
        match self {
            MorphOp::Erode => "eroded",
            MorphOp::Dilate => "dilated",
            MorphOp::Open => "opened",
            MorphOp::Close => "closed",
        }
    }
}

/// Applies `op` to `src`.
pub fn apply(
    src: ImageView<'_, u8>,
    op: MorphOp,
    se: &StructuringElement,
) -> SieveResult<PixelGrid> {
    match op {
        MorphOp::Erode => Ok(erode(src, se)),
        MorphOp::Dilate => Ok(dilate(src, se)),
        MorphOp::Open => open(src, se),
        MorphOp::Close => close(src, se),
    }
}

/// Minimum over the footprint; out-of-bounds samples are 0.
pub fn erode(src: ImageView<'_, u8>, se: &StructuringElement) -> PixelGrid {
    let offsets = se.offsets();
    sweep(src, |x, y| {
        let mut acc = u8::MAX;
        for &(dx, dy) in &offsets {
            let value = sample(src, x, y, dx, dy);
            if value < acc {
                acc = value;
                if acc == 0 {
                    break;
                }
            }
        }
        acc
    })
}

/// Maximum over the reflected footprint; out-of-bounds samples are 0.
pub fn dilate(src: ImageView<'_, u8>, se: &StructuringElement) -> PixelGrid {
    let offsets = se.offsets();
    sweep(src, |x, y| {
        let mut acc = 0u8;
        for &(dx, dy) in &offsets {
            let value = sample(src, x, y, -dx, -dy);
            if value > acc {
                acc = value;
                if acc == u8::MAX {
                    break;
                }
            }
        }
        acc
    })
}

/// Erosion then dilation.
pub fn open(src: ImageView<'_, u8>, se: &StructuringElement) -> SieveResult<PixelGrid> {
    on_padded_canvas(src, se, |canvas| {
        let eroded = erode(canvas, se);
        Ok(dilate(eroded.view()?, se))
    })
}

/// Dilation then erosion.
pub fn close(src: ImageView<'_, u8>, se: &StructuringElement) -> SieveResult<PixelGrid> {
    on_padded_canvas(src, se, |canvas| {
        let dilated = dilate(canvas, se);
        Ok(erode(dilated.view()?, se))
    })
}

#[inline]
fn sample(src: ImageView<'_, u8>, x: usize, y: usize, dx: isize, dy: isize) -> u8 {
    match (
        offset_index(x, dx, src.width()),
        offset_index(y, dy, src.height()),
    ) {
        (Some(sx), Some(sy)) => src.get(sx, sy).copied().unwrap_or(0),
        _ => 0,
    }
}

fn sweep<F>(src: ImageView<'_, u8>, f: F) -> PixelGrid
where
    F: Fn(usize, usize) -> u8 + Send + Sync,
{
    let width = src.width();
    let height = src.height();
    let mut out = vec![0u8; width * height];
    for_each_row(&mut out, width, |y, row| {
        for (x, dst) in row.iter_mut().enumerate() {
            *dst = f(x, y);
        }
    });
    PixelGrid::from_parts(out, width, height, 1, Default::default())
}

fn on_padded_canvas<F>(
    src: ImageView<'_, u8>,
    se: &StructuringElement,
    f: F,
) -> SieveResult<PixelGrid>
where
    F: FnOnce(ImageView<'_, u8>) -> SieveResult<PixelGrid>,
{
    let pad_x = se.width();
    let pad_y = se.height();
    let width = src.width();
    let height = src.height();
    let canvas_w = width + 2 * pad_x;
    let canvas_h = height + 2 * pad_y;

    let mut canvas = vec![0u8; canvas_w * canvas_h];
    for y in 0..height {
        let row = src.row(y).unwrap_or_default();
        let start = (y + pad_y) * canvas_w + pad_x;
        canvas[start..start + width].copy_from_slice(row);
    }
    let canvas = ImageView::from_slice(&canvas, canvas_w, canvas_h)?;
    let result = f(canvas)?;
    Ok(result.view()?.roi(pad_x, pad_y, width, height)?.to_grid())
}
