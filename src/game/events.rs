//! Publish/subscribe hooks for the three notifications the game emits.
//!
//! Handlers run synchronously, in registration order, on the thread that
//! fires the event. A hub may be fired re-entrantly from inside one of its
//! own handlers, and handlers may subscribe or unsubscribe while it fires.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::engine::MergeNotice;
use super::state::{Position, Snapshot};

/// The committed grid changed
#[derive(Debug, Clone, PartialEq)]
pub struct GridChanged {
    pub matrix: Snapshot,
}

/// Two tiles merged (or a manual add landed on an existing tile)
#[derive(Debug, Clone, PartialEq)]
pub struct TilesMerged {
    pub matrix: Snapshot,
    pub notice: MergeNotice,
}

/// A tile was clicked
#[derive(Debug, Clone, PartialEq)]
pub struct TileClicked {
    pub matrix: Snapshot,
    pub pos: Position,
}

pub type Handler<E> = Rc<dyn Fn(&E)>;

type HandlerList<E> = Rc<RefCell<Vec<Handler<E>>>>;

/// Ordered list of handlers for one event type
pub struct EventHub<E> {
    handlers: HandlerList<E>,
}

impl<E: 'static> EventHub<E> {
    pub fn new() -> Self {
        Self {
            handlers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register a closure; the returned handle removes it again
    pub fn on<F>(&self, handler: F) -> Subscription<E>
    where
        F: Fn(&E) + 'static,
    {
        self.on_handler(Rc::new(handler))
    }

    /// Register a shared handler. The same handler may be registered more
    /// than once; each registration is called on every fire.
    pub fn on_handler(&self, handler: Handler<E>) -> Subscription<E> {
        self.handlers.borrow_mut().push(Rc::clone(&handler));
        Subscription {
            handlers: Rc::downgrade(&self.handlers),
            handler: Rc::downgrade(&handler),
        }
    }

    /// Call every handler with `event`, in registration order
    pub fn fire(&self, event: &E) {
        // handlers may touch the list while we iterate
        let handlers: Vec<Handler<E>> = self.handlers.borrow().clone();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }
}

impl<E: 'static> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned from [`EventHub::on`]. Dropping it leaves the handler
/// registered.
#[must_use = "dropping a subscription keeps the handler registered; call unsubscribe to remove it"]
pub struct Subscription<E> {
    handlers: Weak<RefCell<Vec<Handler<E>>>>,
    handler: Weak<dyn Fn(&E)>,
}

impl<E> Subscription<E> {
    /// Remove the first registration of this handler, by identity. Does
    /// nothing if the hub is gone or the handler is no longer registered.
    pub fn unsubscribe(self) {
        let (Some(handlers), Some(handler)) = (self.handlers.upgrade(), self.handler.upgrade())
        else {
            return;
        };
        let mut handlers = handlers.borrow_mut();
        if let Some(index) = handlers.iter().position(|h| Rc::ptr_eq(h, &handler)) {
            handlers.remove(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_fire_in_registration_order() {
        let hub = EventHub::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        let _a = hub.on(move |v| first.borrow_mut().push(("a", *v)));
        let second = Rc::clone(&log);
        let _b = hub.on(move |v| second.borrow_mut().push(("b", *v)));

        hub.fire(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_handler() {
        let hub = EventHub::<()>::new();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        let keep = hub.on(move |_| c.set(c.get() + 1));
        let c = Rc::clone(&count);
        let drop_me = hub.on(move |_| c.set(c.get() + 10));

        drop_me.unsubscribe();
        hub.fire(&());
        assert_eq!(count.get(), 1);
        assert_eq!(hub.len(), 1);

        keep.unsubscribe();
        hub.fire(&());
        assert_eq!(count.get(), 1);
        assert!(hub.is_empty());
    }

    #[test]
    fn test_shared_handler_removed_first_match_only() {
        let hub = EventHub::<()>::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let handler: Handler<()> = Rc::new(move |_| c.set(c.get() + 1));

        let first = hub.on_handler(Rc::clone(&handler));
        let _second = hub.on_handler(Rc::clone(&handler));
        hub.fire(&());
        assert_eq!(count.get(), 2);

        first.unsubscribe();
        hub.fire(&());
        assert_eq!(count.get(), 3);
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn test_unsubscribe_after_hub_dropped() {
        let hub = EventHub::<()>::new();
        let sub = hub.on(|_| {});
        drop(hub);
        sub.unsubscribe();
    }

    #[test]
    fn test_handler_may_subscribe_while_firing() {
        let hub = Rc::new(EventHub::<u32>::new());
        let count = Rc::new(Cell::new(0));

        let inner_hub = Rc::clone(&hub);
        let inner_count = Rc::clone(&count);
        let _outer = hub.on(move |_| {
            let c = Rc::clone(&inner_count);
            let _late = inner_hub.on(move |_| c.set(c.get() + 1));
        });

        hub.fire(&1);
        // the late handler was not part of this fire
        assert_eq!(count.get(), 0);
        assert_eq!(hub.len(), 2);
    }
}
