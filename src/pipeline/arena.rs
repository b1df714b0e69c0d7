//! Per-run storage for named intermediate buffers.

use crate::image::PixelGrid;

/// Handle to a published buffer, valid for the arena that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(usize);

/// Owns every buffer a run publishes, in publication order.
///
/// Stages build their output privately and hand it over with
/// [`StageArena::publish`]; a buffer is either absent or complete. Dropping
/// the arena releases all buffers at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageArena {
    buffers: Vec<(String, PixelGrid)>,
}

impl StageArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `grid` under `name` and returns its handle.
    ///
    /// A name that is already taken gets a numeric suffix: `opened`,
    /// `opened_2`, `opened_3`, ...
    pub fn publish(&mut self, name: &str, grid: PixelGrid) -> BufferId {
        let mut key = name.to_string();
        let mut n = 1;
        while self.get(&key).is_some() {
            n += 1;
            key = format!("{name}_{n}");
        }
        self.buffers.push((key, grid));
        BufferId(self.buffers.len() - 1)
    }

    /// Returns the buffer behind a handle issued by this arena.
    pub fn buffer(&self, id: BufferId) -> &PixelGrid {
        &self.buffers[id.0].1
    }

    /// Returns the name a handle was published under.
    pub fn name(&self, id: BufferId) -> &str {
        &self.buffers[id.0].0
    }

    /// Returns the buffer published under `name`.
    pub fn get(&self, name: &str) -> Option<&PixelGrid> {
        self.buffers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, grid)| grid)
    }

    /// Buffer names in publication order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buffers.iter().map(|(key, _)| key.as_str())
    }

    /// `(name, buffer)` pairs in publication order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PixelGrid)> {
        self.buffers.iter().map(|(key, grid)| (key.as_str(), grid))
    }

    /// Number of published buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// True when nothing has been published.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Consumes the arena, returning its buffers in publication order.
    pub fn into_vec(self) -> Vec<(String, PixelGrid)> {
        self.buffers
    }
}

#[cfg(test)]
mod tests {
    use super::StageArena;
    use crate::image::PixelGrid;

    #[test]
    fn repeated_names_get_suffixes() {
        let mut arena = StageArena::new();
        let grid = PixelGrid::filled(1, 1, 1, 0).unwrap();
        let first = arena.publish("opened", grid.clone());
        let second = arena.publish("opened", grid.clone());
        let third = arena.publish("opened", grid);
        assert_eq!(arena.name(first), "opened");
        assert_eq!(arena.name(second), "opened_2");
        assert_eq!(arena.name(third), "opened_3");
        let names: Vec<_> = arena.names().collect();
        assert_eq!(names, ["opened", "opened_2", "opened_3"]);
        assert_eq!(arena.get("opened_2"), Some(arena.buffer(second)));
    }
}
