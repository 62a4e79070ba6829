//! Z-ordered object storage with a hard capacity.

use crate::{DrawingObject, ObjectId};

/// Default maximum number of objects kept on a canvas.
pub const MAX_OBJECTS: usize = 500;

/// Ordered collection of drawing objects.
///
/// Insertion order is z-order: the last object is drawn on top and wins hit
/// tests.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    objects: Vec<DrawingObject>,
    capacity: usize,
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new(MAX_OBJECTS)
    }
}

impl ObjectStore {
    /// Create an empty store holding at most `capacity` objects.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            objects: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of objects.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an object on top.
    ///
    /// If the store is full, the bottom object is evicted first and returned.
    /// Eviction is final: the caller must not keep it for undo.
    pub fn add(&mut self, object: DrawingObject) -> Option<DrawingObject> {
        let evicted = if self.objects.len() >= self.capacity {
            Some(self.objects.remove(0))
        } else {
            None
        };
        if let Some(old) = &evicted {
            tracing::info!(
                "Object cap of {} reached, evicting oldest {} {}",
                self.capacity,
                old.kind().name(),
                old.id()
            );
        }
        self.objects.push(object);
        evicted
    }

    /// Remove the object at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<DrawingObject> {
        (index < self.objects.len()).then(|| self.objects.remove(index))
    }

    /// Remove an object by ID.
    pub fn remove(&mut self, id: ObjectId) -> Option<DrawingObject> {
        let index = self.index_of(id)?;
        self.remove_at(index)
    }

    /// Remove and return the topmost object.
    pub fn pop(&mut self) -> Option<DrawingObject> {
        self.objects.pop()
    }

    /// Position of an object in z-order.
    #[must_use]
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    /// Get an object by ID.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&DrawingObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    /// Get a mutable reference to an object by ID.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut DrawingObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    /// Check whether an object is still in the store.
    #[must_use]
    pub fn contains_id(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    /// Objects from bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DrawingObject> {
        self.objects.iter()
    }

    /// Objects as a slice, bottom to top.
    #[must_use]
    pub fn as_slice(&self) -> &[DrawingObject] {
        &self.objects
    }

    /// Find the topmost object containing the canvas-space point.
    #[must_use]
    pub fn find_topmost_containing(&self, x: f32, y: f32) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.contains(x, y))
            .map(DrawingObject::id)
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
