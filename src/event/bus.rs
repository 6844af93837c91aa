use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{Event, EventHandler};
use crate::id_generator::generate_id;

/// Token returned by [`EventBus::subscribe`], used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<E: Event> {
    kind: E::Kind,
    id: ListenerId,
    handler: Rc<dyn EventHandler<E>>,
}

/// A simple event bus for broadcasting events to handlers registered per kind
pub struct EventBus<E: Event> {
    listeners: RefCell<Vec<Listener<E>>>,
}

impl<E: Event> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &format!("<{} listeners>", self.listeners.borrow().len()))
            .finish()
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> EventBus<E> {
    /// Creates a new event bus
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe a handler to events of the given kind
    pub fn subscribe(&self, kind: E::Kind, handler: impl EventHandler<E> + 'static) -> ListenerId {
        let id = ListenerId(generate_id());
        self.listeners.borrow_mut().push(Listener {
            kind,
            id,
            handler: Rc::new(handler),
        });
        id
    }

    /// Remove a previously subscribed handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, kind: E::Kind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| !(l.kind == kind && l.id == id));
        listeners.len() != before
    }

    /// Emit an event to every handler registered for its kind, in registration order
    pub fn emit(&self, event: E) {
        let kind = event.kind();
        // Snapshot so handlers may (un)subscribe while being called.
        let handlers: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| Rc::clone(&l.handler))
            .collect();
        for handler in handlers {
            handler.handle_event(&event);
        }
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.borrow().iter().filter(|l| l.kind == kind).count()
    }
}
