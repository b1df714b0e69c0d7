//! Rayon row-parallel scans (feature-gated).
//!
//! Placements are split by row; each worker keeps a local top-K and the
//! partial lists are merged with the same ordering the sequential scan uses,
//! so results are identical to [`Kernel::scan_full`].

use crate::candidate::topk::{Peak, TopK};
use crate::image::ImageView;
use crate::kernel::{placement_range, scan_row, Kernel, ScanParams};
use crate::template::TemplatePlan;
use crate::util::SieveResult;
use rayon::prelude::*;

/// Row-parallel full scan for any kernel.
pub fn scan_full_par<K: Kernel>(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    params: ScanParams,
) -> SieveResult<Vec<Peak>> {
    let (max_x, max_y) = placement_range(image, plan)?;
    if params.topk == 0 {
        return Ok(Vec::new());
    }

    let merged = (0..=max_y)
        .into_par_iter()
        .fold(
            || TopK::new(params.topk),
            |mut local, y| {
                scan_row::<K>(image, plan, y, 0, max_x, params, &mut local);
                local
            },
        )
        .reduce(
            || TopK::new(params.topk),
            |mut a, b| {
                a.extend(b);
                a
            },
        );

    Ok(merged.into_sorted_desc())
}
