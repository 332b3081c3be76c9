//! Patch-change listeners.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Observer notified after a patch load (successful or not) has completed.
///
/// Called on the thread that performed the load, after the parameter table
/// holds its final contents. No processor lock is held during the call, so
/// implementations may query parameters. Loading another patch from inside
/// the callback deadlocks: loads are serialized.
pub trait PatchListener: Send + Sync {
    /// The loaded patch (and therefore the parameter table) changed.
    fn patch_changed(&self);
}

/// Set of non-owning listener references.
///
/// Entries are [`Weak`], so the registry never extends a listener's
/// lifetime; entries whose listener has been dropped are pruned on the next
/// registry operation. Identity is the listener's allocation: adding the same
/// `Arc` twice registers it once.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<Vec<Weak<dyn PatchListener>>>,
}

fn same_listener(a: &Weak<dyn PatchListener>, b: &Weak<dyn PatchListener>) -> bool {
    std::ptr::addr_eq(a.as_ptr(), b.as_ptr())
}

impl ListenerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. Returns `false` if it was already registered.
    pub fn add<L>(&self, listener: &Arc<L>) -> bool
    where
        L: PatchListener + 'static,
    {
        let weak: Weak<dyn PatchListener> = Arc::downgrade(listener) as Weak<dyn PatchListener>;
        let mut listeners = self.listeners.lock();
        listeners.retain(|l| l.strong_count() > 0);
        if listeners.iter().any(|l| same_listener(l, &weak)) {
            return false;
        }
        listeners.push(weak);
        true
    }

    /// Deregister `listener`. Returns `false` if it was not registered.
    pub fn remove<L>(&self, listener: &Arc<L>) -> bool
    where
        L: PatchListener + 'static,
    {
        let weak: Weak<dyn PatchListener> = Arc::downgrade(listener) as Weak<dyn PatchListener>;
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|l| l.strong_count() > 0 && !same_listener(l, &weak));
        listeners.len() != before
    }

    /// Drop entries whose listener no longer exists.
    pub fn prune(&self) {
        self.listeners.lock().retain(|l| l.strong_count() > 0);
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    /// Whether no live listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call [`PatchListener::patch_changed`] on every live listener.
    ///
    /// The set is snapshotted under the registry lock and the callbacks run
    /// after it is released, so a listener may add or remove listeners from
    /// inside its callback. Returns the number of listeners notified.
    pub fn notify_all(&self) -> usize {
        let snapshot: Vec<Arc<dyn PatchListener>> = {
            let mut listeners = self.listeners.lock();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in &snapshot {
            listener.patch_changed();
        }
        snapshot.len()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
