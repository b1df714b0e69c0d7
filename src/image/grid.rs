//! Owned interleaved pixel buffer.

use crate::image::ImageView;
use crate::util::{SieveError, SieveResult};

/// Order of the colour samples in a 3- or 4-channel grid.
///
/// Alpha, when present, is always the last sample of a pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Red, green, blue (the layout decoded images use).
    #[default]
    Rgb,
    /// Blue, green, red.
    Bgr,
}

/// Owned row-major image with 1, 3 or 4 interleaved 8-bit channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
    order: ChannelOrder,
}

impl PixelGrid {
    /// Wraps a contiguous buffer of `width * height * channels` samples.
    pub fn new(data: Vec<u8>, width: usize, height: usize, channels: usize) -> SieveResult<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(SieveError::UnsupportedChannelLayout { channels });
        }
        let needed = sample_count(width, height, channels)?;
        if data.len() < needed {
            return Err(SieveError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(SieveError::InvalidParameter {
                name: "data",
                reason: "buffer longer than width * height * channels",
            });
        }
        Ok(Self::from_parts(
            data,
            width,
            height,
            channels,
            ChannelOrder::default(),
        ))
    }

    /// Wraps a single-channel buffer.
    pub fn gray(data: Vec<u8>, width: usize, height: usize) -> SieveResult<Self> {
        Self::new(data, width, height, 1)
    }

    /// Creates a grid with every sample set to `value`.
    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> SieveResult<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(SieveError::UnsupportedChannelLayout { channels });
        }
        let len = sample_count(width, height, channels)?;
        Ok(Self::from_parts(
            vec![value; len],
            width,
            height,
            channels,
            ChannelOrder::default(),
        ))
    }

    /// Returns the grid with its colour order replaced.
    pub fn with_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    pub(crate) fn from_parts(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
        order: ChannelOrder,
    ) -> Self {
        debug_assert_eq!(data.len(), width * height * channels);
        Self {
            data,
            width,
            height,
            channels,
            order,
        }
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the colour order for 3- and 4-channel grids.
    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// Returns true for single-channel grids.
    pub fn is_gray(&self) -> bool {
        self.channels == 1
    }

    /// Returns the raw interleaved samples.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the raw interleaved samples mutably.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the grid and returns its samples.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Returns the samples of the pixel at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.channels;
        self.data.get(start..start + self.channels)
    }

    /// Returns the first sample of the pixel at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.pixel(x, y).map(|px| px[0])
    }

    /// Returns a borrowed view of a single-channel grid.
    pub fn view(&self) -> SieveResult<ImageView<'_, u8>> {
        if self.channels != 1 {
            return Err(SieveError::UnsupportedChannelLayout {
                channels: self.channels,
            });
        }
        ImageView::from_slice(&self.data, self.width, self.height)
    }

    /// Returns true when every sample is either 0 or 255.
    pub fn is_binary(&self) -> bool {
        self.data.iter().all(|&v| v == 0 || v == 255)
    }

    /// Checks that `other` has the same width, height and channel count.
    pub(crate) fn ensure_same_shape(&self, other: &PixelGrid) -> SieveResult<()> {
        let dims = |g: &PixelGrid| (g.width, g.height, g.channels);
        if dims(self) != dims(other) {
            return Err(SieveError::mismatch(dims(other), dims(self)));
        }
        Ok(())
    }
}

fn sample_count(width: usize, height: usize, channels: usize) -> SieveResult<usize> {
    if width == 0 || height == 0 {
        return Err(SieveError::EmptyImage { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(channels))
        .ok_or(SieveError::EmptyImage { width, height })
}
