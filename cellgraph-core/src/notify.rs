//! Change notification.
//!
//! Observers (a dependency viewer, typically) register a callback and are
//! told that the graph changed after every mutation. The notification carries
//! no payload; observers re-pull whatever they render.

use std::sync::Arc;

/// Handle for a registered observer, valid for the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Observer {
    id: ObserverId,
    on_change: Callback,
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer").field("id", &self.id).finish_non_exhaustive()
    }
}

/// The observers attached to one graph, in registration order.
#[derive(Debug, Default)]
pub struct Observers {
    next_id: u64,
    registered: Vec<Observer>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback, returning the id to unsubscribe with.
    pub fn subscribe<F>(&mut self, on_change: F) -> ObserverId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.registered.push(Observer {
            id,
            on_change: Arc::new(on_change),
        });
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.registered.len();
        self.registered.retain(|o| o.id != id);
        self.registered.len() != before
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Tell every observer the graph changed.
    pub fn notify_all(&self) {
        for observer in &self.registered {
            (observer.on_change)();
        }
    }

    /// Clone out the callbacks so they can run after a lock is released.
    pub(crate) fn callbacks(&self) -> Vec<Callback> {
        self.registered.iter().map(|o| Arc::clone(&o.on_change)).collect()
    }
}
