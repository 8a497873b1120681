use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

type Handler<P> = Rc<RefCell<dyn FnMut(&P)>>;

/// Bus carrying the names of project templates that were just added to the
/// ready-to-import list.
pub type ProjectTemplateBus = NotificationBus<str>;

struct Registry<P: ?Sized> {
    next_id: u64,
    handlers: Vec<(u64, Handler<P>)>,
}

trait Detach {
    fn detach(&self, id: u64);
}

impl<P: ?Sized> Detach for RefCell<Registry<P>> {
    fn detach(&self, id: u64) {
        self.borrow_mut()
            .handlers
            .retain(|(handler_id, _)| *handler_id != id);
    }
}

/// In-process publish/subscribe channel scoped to one wizard.
///
/// Handlers run synchronously on the publishing thread, in the order they
/// subscribed. Cloning the bus yields another handle to the same registry.
pub struct NotificationBus<P: ?Sized> {
    registry: Rc<RefCell<Registry<P>>>,
}

impl<P: ?Sized> Clone for NotificationBus<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<P: ?Sized + 'static> Default for NotificationBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized + 'static> NotificationBus<P> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&P) + 'static,
    {
        let handler: Handler<P> = Rc::new(RefCell::new(handler));
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.push((id, handler));

        let weak = Rc::downgrade(&self.registry);
        let weak: Weak<dyn Detach> = weak;
        Subscription {
            id,
            registry: Some(weak),
        }
    }

    /// Delivers `payload` to every current subscriber and returns how many
    /// handlers ran.
    pub fn publish(&self, payload: &P) -> usize {
        let snapshot: Vec<(u64, Handler<P>)> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(id, handler)| (*id, Rc::clone(handler)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in snapshot {
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    (&mut *handler)(payload);
                    delivered += 1;
                }
                Err(_) => debug!(subscription = id, "skipping re-entrant notification"),
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

/// Keeps a handler registered; dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    registry: Option<Weak<dyn Detach>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(registry) = self.registry.take().and_then(|weak| weak.upgrade()) {
            registry.detach(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.registry.is_some())
            .finish()
    }
}
