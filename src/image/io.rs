//! Acquisition helpers backed by the `image` crate.
//!
//! Available when the `image-io` feature is enabled. These sit outside the
//! processing core: they turn files into `PixelGrid`s, load a directory of
//! glyph images as a catalog, and write intermediates back to disk.

use crate::catalog::GlyphMap;
use crate::image::{ChannelOrder, PixelGrid};
use crate::util::{SieveError, SieveResult};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use std::fs;
use std::path::Path;

/// Converts a decoded image into a grid, keeping gray/RGB/RGBA layouts.
pub fn grid_from_dynamic(img: &DynamicImage) -> SieveResult<PixelGrid> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    match img {
        DynamicImage::ImageLuma8(gray) => PixelGrid::new(gray.as_raw().clone(), width, height, 1),
        DynamicImage::ImageRgb8(rgb) => PixelGrid::new(rgb.as_raw().clone(), width, height, 3),
        other => PixelGrid::new(other.to_rgba8().into_raw(), width, height, 4),
    }
}

/// Loads an image from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> SieveResult<PixelGrid> {
    let img = image::open(path).map_err(|err| SieveError::AcquisitionFailure {
        reason: err.to_string(),
    })?;
    grid_from_dynamic(&img)
}

/// Loads every `<label>.png` in `dir` as a glyph keyed by its file stem.
pub fn load_glyph_dir<P: AsRef<Path>>(dir: P) -> SieveResult<GlyphMap> {
    let entries = fs::read_dir(dir).map_err(|err| SieveError::AcquisitionFailure {
        reason: err.to_string(),
    })?;
    let mut glyphs = GlyphMap::new();
    for entry in entries {
        let path = entry
            .map_err(|err| SieveError::AcquisitionFailure {
                reason: err.to_string(),
            })?
            .path();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if !is_png {
            continue;
        }
        let Some(label) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        glyphs.insert(label, load_image(&path)?);
    }
    Ok(glyphs)
}

/// Writes a grid to disk; the format follows the file extension.
pub fn save_grid<P: AsRef<Path>>(grid: &PixelGrid, path: P) -> SieveResult<()> {
    let width = grid.width() as u32;
    let height = grid.height() as u32;
    let encode_err = || SieveError::AcquisitionFailure {
        reason: "buffer does not match image size".to_string(),
    };
    let img = match grid.channels() {
        1 => DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, grid.data().to_vec()).ok_or_else(encode_err)?,
        ),
        3 => DynamicImage::ImageRgb8(
            RgbImage::from_raw(width, height, rgb_ordered(grid, 3)).ok_or_else(encode_err)?,
        ),
        _ => DynamicImage::ImageRgba8(
            RgbaImage::from_raw(width, height, rgb_ordered(grid, 4)).ok_or_else(encode_err)?,
        ),
    };
    img.save(path).map_err(|err| SieveError::AcquisitionFailure {
        reason: err.to_string(),
    })
}

fn rgb_ordered(grid: &PixelGrid, channels: usize) -> Vec<u8> {
    let mut data = grid.data().to_vec();
    if grid.order() == ChannelOrder::Bgr {
        for px in data.chunks_exact_mut(channels) {
            px.swap(0, 2);
        }
    }
    data
}
