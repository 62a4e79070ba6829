//! Thread-safe canvas handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{Canvas, PointerEvent};

/// A canvas behind a mutex, cloneable across threads.
///
/// Every operation holds the lock for its whole duration, so each one is
/// atomic with respect to rendering and snapshotting.
#[derive(Debug, Clone, Default)]
pub struct SharedCanvas {
    inner: Arc<Mutex<Canvas>>,
}

impl SharedCanvas {
    /// Wrap a canvas.
    #[must_use]
    pub fn new(canvas: Canvas) -> Self {
        Self {
            inner: Arc::new(Mutex::new(canvas)),
        }
    }

    /// Lock the canvas. A poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, Canvas> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a read-only closure under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&Canvas) -> R) -> R {
        f(&self.lock())
    }

    /// Run a mutating closure under the lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut Canvas) -> R) -> R {
        f(&mut self.lock())
    }

    /// Feed one pointer event through the gesture state machine.
    pub fn handle_pointer(&self, event: &PointerEvent) -> bool {
        self.lock().handle_pointer(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_updates() {
        let shared = SharedCanvas::default();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for j in 0..10 {
                        #[allow(clippy::cast_precision_loss)]
                        let x = (i * 100 + j) as f32;
                        shared.handle_pointer(&PointerEvent::down(x, 10.0));
                        shared.handle_pointer(&PointerEvent::up(x, 10.0));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread");
        }
        // Interleaved down/up pairs may merge, but never lose the lock.
        let count = shared.read(Canvas::object_count);
        assert!(count > 0 && count <= 40);
    }

    #[test]
    fn test_update_returns_value() {
        let shared = SharedCanvas::default();
        let id = shared.update(|c| c.add_text("hello")).expect("text");
        assert!(shared.read(|c| c.objects().contains_id(id)));
    }
}
