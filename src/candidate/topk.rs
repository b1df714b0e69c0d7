//! Top-K candidate tracking for match peaks.

use std::cmp::Ordering;

/// Scored template placement (top-left corner).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the placement.
    pub x: usize,
    /// Y coordinate (row) of the placement.
    pub y: usize,
    /// Match score; higher is better.
    pub score: f64,
}

// Score descending, then row-major position so ties keep the first occurrence.
fn peak_cmp_desc(a: &Peak, b: &Peak) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
}

/// Sorts peaks by descending score with deterministic tie-breaking.
pub(crate) fn sort_peaks_desc(peaks: &mut [Peak]) {
    peaks.sort_by(peak_cmp_desc);
}

/// Top-K container with O(k) insertion cost.
pub struct TopK<T> {
    k: usize,
    items: Vec<T>,
}

impl TopK<Peak> {
    /// Creates a new Top-K collector.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k),
        }
    }

    /// Pushes a peak, evicting the lowest-ranked one if at capacity.
    pub fn push(&mut self, peak: Peak) {
        if self.k == 0 {
            return;
        }
        if self.items.len() < self.k {
            self.items.push(peak);
            return;
        }

        let mut worst_idx = 0usize;
        for (idx, item) in self.items.iter().enumerate().skip(1) {
            if peak_cmp_desc(item, &self.items[worst_idx]) == Ordering::Greater {
                worst_idx = idx;
            }
        }

        if peak_cmp_desc(&peak, &self.items[worst_idx]) == Ordering::Less {
            self.items[worst_idx] = peak;
        }
    }

    /// Merges another collector into this one.
    pub fn extend(&mut self, other: TopK<Peak>) {
        for peak in other.items {
            self.push(peak);
        }
    }

    /// Returns the number of retained peaks.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when no peak has been retained.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns peaks sorted by descending score.
    pub fn into_sorted_desc(mut self) -> Vec<Peak> {
        sort_peaks_desc(&mut self.items);
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::{Peak, TopK};

    fn peak(x: usize, y: usize, score: f64) -> Peak {
        Peak { x, y, score }
    }

    #[test]
    fn keeps_best_k_in_order() {
        let mut topk = TopK::new(2);
        topk.push(peak(0, 0, 0.1));
        topk.push(peak(1, 0, 0.9));
        topk.push(peak(2, 0, 0.5));
        topk.push(peak(3, 0, 0.2));
        let peaks = topk.into_sorted_desc();
        assert_eq!(peaks, vec![peak(1, 0, 0.9), peak(2, 0, 0.5)]);
    }

    #[test]
    fn ties_prefer_row_major_first() {
        let mut topk = TopK::new(1);
        topk.push(peak(5, 2, 1.0));
        topk.push(peak(1, 3, 1.0));
        topk.push(peak(0, 2, 1.0));
        topk.push(peak(9, 0, 1.0));
        assert_eq!(topk.into_sorted_desc(), vec![peak(9, 0, 1.0)]);
    }

    #[test]
    fn merged_collectors_keep_global_order() {
        let mut a = TopK::new(2);
        a.push(peak(0, 1, 0.3));
        a.push(peak(0, 2, 0.8));
        let mut b = TopK::new(2);
        b.push(peak(4, 0, 0.8));
        b.push(peak(1, 1, 0.1));
        a.extend(b);
        assert_eq!(a.into_sorted_desc(), vec![peak(4, 0, 0.8), peak(0, 2, 0.8)]);
    }
}
