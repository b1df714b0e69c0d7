//! Pixel buffers and borrowed views.
//!
//! `PixelGrid` is the owned, row-major buffer every stage produces. It carries
//! 1, 3 or 4 interleaved 8-bit channels. `ImageView` is a borrowed 2D view
//! into a single-channel buffer with an explicit stride. The stride counts
//! elements between the starts of consecutive rows, so a stride larger than
//! the width represents padded rows. ROI slices are zero-copy views into the
//! same backing slice and retain the original stride.

use crate::util::{SieveError, SieveResult};

mod grid;
#[cfg(feature = "image-io")]
pub mod io;

pub use grid::{ChannelOrder, PixelGrid};

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> SieveResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> SieveResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(SieveError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns `(width, height)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> SieveResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(SieveError::EmptyImage { width, height });
        }

        let out_of_bounds = SieveError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(SieveError::EmptyImage {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(SieveError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.stride)
    }
}

impl ImageView<'_, u8> {
    /// Copies the view into a contiguous single-channel grid.
    pub fn to_grid(&self) -> PixelGrid {
        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            let start = y * self.stride;
            data.extend_from_slice(&self.data[start..start + self.width]);
        }
        PixelGrid::from_parts(data, self.width, self.height, 1, ChannelOrder::default())
    }

    /// Returns true when every sample is either 0 or 255.
    pub fn is_binary(&self) -> bool {
        (0..self.height).all(|y| {
            let start = y * self.stride;
            self.data[start..start + self.width]
                .iter()
                .all(|&v| v == 0 || v == 255)
        })
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> SieveResult<usize> {
    if width == 0 || height == 0 {
        return Err(SieveError::EmptyImage { width, height });
    }
    if stride < width {
        return Err(SieveError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(SieveError::EmptyImage { width, height })?;
    Ok(needed)
}
