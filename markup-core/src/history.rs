//! Undo/redo over the object store.

use crate::{DrawingObject, ObjectId, ObjectStore};

/// Undo/redo history.
///
/// Undo moves the topmost object off the canvas onto the history stack, where
/// it stays intact for redo. New work clears the stack.
#[derive(Debug, Clone, Default)]
pub struct History {
    undone: Vec<DrawingObject>,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the store as new work.
    ///
    /// Anything previously undone becomes unreachable. Returns the object evicted
    /// by the store's capacity, if any.
    pub fn commit(
        &mut self,
        store: &mut ObjectStore,
        object: DrawingObject,
    ) -> Option<DrawingObject> {
        if !self.undone.is_empty() {
            tracing::debug!("Dropping {} undone objects", self.undone.len());
            self.undone.clear();
        }
        store.add(object)
    }

    /// Take the most recent object off the canvas.
    ///
    /// Returns the ID of the undone object, or `None` if the canvas was empty.
    pub fn undo(&mut self, store: &mut ObjectStore) -> Option<ObjectId> {
        let object = store.pop()?;
        let id = object.id();
        self.undone.push(object);
        Some(id)
    }

    /// Put the most recently undone object back on top.
    pub fn redo(&mut self, store: &mut ObjectStore) -> Option<ObjectId> {
        let object = self.undone.pop()?;
        let id = object.id();
        store.add(object);
        Some(id)
    }

    /// Whether there is anything to undo in `store`.
    #[must_use]
    pub fn can_undo(&self, store: &ObjectStore) -> bool {
        !store.is_empty()
    }

    /// Whether there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Number of objects waiting to be redone.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.undone.len()
    }
}
