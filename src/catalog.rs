//! Reference glyph lookup.

use crate::image::PixelGrid;
use std::collections::BTreeMap;

/// Read-only source of reference glyph images keyed by character label.
pub trait GlyphCatalog: Sync {
    /// Returns the glyph image for `label`, if present.
    fn lookup_glyph(&self, label: &str) -> Option<&PixelGrid>;

    /// Returns every label in catalog order.
    fn labels(&self) -> Vec<String>;
}

/// In-memory catalog ordered by label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMap {
    glyphs: BTreeMap<String, PixelGrid>,
}

impl GlyphMap {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the glyph for `label`.
    pub fn insert(&mut self, label: impl Into<String>, glyph: PixelGrid) -> Option<PixelGrid> {
        self.glyphs.insert(label.into(), glyph)
    }

    /// Returns the number of glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true when the catalog holds no glyphs.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl GlyphCatalog for GlyphMap {
    fn lookup_glyph(&self, label: &str) -> Option<&PixelGrid> {
        self.glyphs.get(label)
    }

    fn labels(&self) -> Vec<String> {
        self.glyphs.keys().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<(S, PixelGrid)> for GlyphMap {
    fn from_iter<I: IntoIterator<Item = (S, PixelGrid)>>(iter: I) -> Self {
        let mut map = GlyphMap::new();
        for (label, glyph) in iter {
            map.insert(label, glyph);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::{GlyphCatalog, GlyphMap};
    use crate::image::PixelGrid;

    #[test]
    fn labels_are_sorted_and_lookup_works() {
        let glyphs: GlyphMap = [
            ("b", PixelGrid::filled(2, 2, 1, 1).unwrap()),
            ("a", PixelGrid::filled(3, 3, 1, 2).unwrap()),
        ]
        .into_iter()
        .collect();
        assert_eq!(glyphs.labels(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(glyphs.lookup_glyph("a").map(|g| g.shape()), Some((3, 3)));
        assert!(glyphs.lookup_glyph("z").is_none());
    }
}
