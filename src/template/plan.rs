//! Template plan precomputation for ZNCC and the flat-template fallback.

use crate::image::ImageView;

// Below this sum of squared deviations a template is treated as flat.
const FLAT_EPS: f64 = 1e-8;

/// Precomputed statistics and zero-mean buffer for template matching.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    mean: f64,
    var_t: f64,
    t_prime: Vec<f64>,
    samples: Vec<f64>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    ///
    /// Views are non-empty by construction, so planning cannot fail; a flat
    /// template is reported through [`TemplatePlan::is_flat`] instead.
    pub fn from_view(tpl: ImageView<'_, u8>) -> Self {
        let width = tpl.width();
        let height = tpl.height();

        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            let row = tpl.row(y).unwrap_or_default();
            samples.extend(row.iter().map(|&v| f64::from(v)));
        }

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let t_prime: Vec<f64> = samples.iter().map(|v| v - mean).collect();
        let var_t = t_prime.iter().map(|d| d * d).sum();

        Self {
            width,
            height,
            mean,
            var_t,
            t_prime,
            samples,
        }
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of template pixels.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; plans are built from non-empty views.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the mean intensity of the template.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Returns the sum of squared deviations from the mean.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    /// Returns true when every template pixel has the same value.
    pub fn is_flat(&self) -> bool {
        self.var_t <= FLAT_EPS
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn t_prime(&self) -> &[f64] {
        &self.t_prime
    }

    /// Returns the raw template samples in row-major order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}
