//! Observable state container.

use tokio::sync::watch;

/// Holds a single state value, hands out cloned snapshots, and notifies
/// subscribers on every replacement.
///
/// Writers never mutate in place: `update` computes a fresh value from the
/// current one and publishes it atomically, so observers always see a
/// consistent snapshot.
pub struct StateStore<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> StateStore<T> {
    /// Create a store seeded with `initial`.
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Cloned snapshot of the current value.
    pub fn snapshot(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Replace the current value with `next(current)` and notify
    /// subscribers. The read-compute-replace step is atomic with respect
    /// to other writers.
    pub fn update(&self, next: impl FnOnce(&T) -> T) {
        self.tx.send_modify(|value| *value = next(value));
    }
}
