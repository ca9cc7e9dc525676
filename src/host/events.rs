//! Single-threaded event bus with detachable subscriptions

use super::VaultFile;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Changes reported by the host vault and metadata cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    Created(VaultFile),
    Deleted(VaultFile),
    Renamed { file: VaultFile, old_path: String },
    /// Metadata of one file became available
    MetadataResolved(VaultFile),
    /// Derived metadata settled after a batch of changes
    CacheSettled,
}

type Listener<E> = Rc<dyn Fn(&E)>;

struct BusInner<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

/// Broadcasts events to every attached listener
pub struct EventBus<E> {
    inner: Rc<RefCell<BusInner<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventBus<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Attach a listener; it stays attached while the subscription lives
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Rc::new(listener)));
            id
        };

        let weak: Weak<RefCell<BusInner<E>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
            }
        })
    }

    /// Deliver `event` to the listeners attached at call time
    pub fn emit(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// Handle of an attached listener, detaches on drop
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detach now
    pub fn detach(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_listeners() {
        let bus: EventBus<u32> = EventBus::new();
        let seen = Rc::new(Cell::new(0));
        let seen_in = Rc::clone(&seen);
        let _sub = bus.subscribe(move |n| seen_in.set(seen_in.get() + n));

        bus.emit(&2);
        bus.emit(&3);
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn test_detach_and_drop() {
        let bus: EventBus<()> = EventBus::new();
        let a = bus.subscribe(|()| {});
        let b = bus.subscribe(|()| {});
        assert_eq!(bus.listener_count(), 2);

        a.detach();
        assert_eq!(bus.listener_count(), 1);
        drop(b);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_listener_may_subscribe_during_emit() {
        let bus: EventBus<()> = EventBus::new();
        let inner_bus = bus.clone();
        let held = Rc::new(RefCell::new(Vec::new()));
        let held_in = Rc::clone(&held);
        let _sub = bus.subscribe(move |()| {
            held_in.borrow_mut().push(inner_bus.subscribe(|()| {}));
        });

        bus.emit(&());
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus: EventBus<()> = EventBus::new();
        let sub = bus.subscribe(|()| {});
        drop(bus);
        drop(sub);
    }
}
