//! Glyph templates and their precomputed matching plans.

use crate::filter::to_gray;
use crate::image::{ImageView, PixelGrid};
use crate::util::SieveResult;

mod plan;

pub use plan::TemplatePlan;

/// Owned grayscale glyph template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    grid: PixelGrid,
}

impl Template {
    /// Creates a template from a contiguous grayscale buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> SieveResult<Self> {
        Ok(Self {
            grid: PixelGrid::gray(data, width, height)?,
        })
    }

    /// Converts a catalog glyph of any supported layout to a grayscale template.
    pub fn from_grid(grid: &PixelGrid) -> SieveResult<Self> {
        Ok(Self {
            grid: to_gray(grid)?,
        })
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> SieveResult<ImageView<'_, u8>> {
        self.grid.view()
    }

    /// Returns `(width, height)`.
    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    /// Precomputes the matching plan for this template.
    pub fn plan(&self) -> SieveResult<TemplatePlan> {
        Ok(TemplatePlan::from_view(self.view()?))
    }
}
