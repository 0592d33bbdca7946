//! Bounded snapshot history.

use crate::scene::Scene;

/// Maximum number of snapshots to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Linear history of full scene snapshots.
///
/// `index` always points at the snapshot of the current state. Committing
/// after an undo discards the snapshots past `index`.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Scene>,
    index: usize,
}

impl History {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: Scene) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    /// Record `scene` as the new current state.
    ///
    /// Returns `false` if it equals the current snapshot.
    pub fn commit(&mut self, scene: &Scene) -> bool {
        if self.entries.get(self.index) == Some(scene) {
            return false;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(scene.clone());
        if self.entries.len() > MAX_UNDO_HISTORY {
            self.entries.remove(0);
            log::debug!("History full, evicted oldest snapshot");
        }
        self.index = self.entries.len() - 1;
        log::debug!("Committed history entry {}", self.index);
        true
    }

    /// Step back, returning the snapshot to restore.
    pub fn undo(&mut self) -> Option<&Scene> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self) -> Option<&Scene> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> &Scene {
        &self.entries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Scene::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::Background;

    fn scene(n: usize) -> Scene {
        Scene::with_background(Background::sniff(&format!("#{n:06x}")))
    }

    #[test]
    fn test_commit_and_undo_to_start() {
        let initial = scene(0);
        let mut history = History::new(initial.clone());
        for n in 1..=10 {
            assert!(history.commit(&scene(n)));
        }
        assert_eq!(history.index(), 10);
        for _ in 0..10 {
            assert!(history.undo().is_some());
        }
        assert_eq!(history.current(), &initial);
        assert!(history.undo().is_none());
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_duplicate_commit_is_ignored() {
        let mut history = History::new(scene(0));
        assert!(history.commit(&scene(1)));
        assert!(!history.commit(&scene(1)));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_eviction_keeps_index_on_newest() {
        let mut history = History::new(scene(0));
        for n in 1..=80 {
            history.commit(&scene(n));
        }
        assert_eq!(history.len(), MAX_UNDO_HISTORY);
        assert_eq!(history.index(), MAX_UNDO_HISTORY - 1);
        assert_eq!(history.current(), &scene(80));
    }

    #[test]
    fn test_commit_after_undo_truncates() {
        let mut history = History::new(scene(0));
        history.commit(&scene(1));
        history.commit(&scene(2));
        history.undo();
        assert!(history.can_redo());
        history.commit(&scene(3));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(&scene(1)));
    }

    #[test]
    fn test_redo() {
        let mut history = History::new(scene(0));
        history.commit(&scene(1));
        assert!(history.redo().is_none());
        history.undo();
        assert_eq!(history.redo(), Some(&scene(1)));
        assert!(!history.can_redo());
    }
}
