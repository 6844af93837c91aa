mod bus;
mod events;

pub use bus::{EventBus, ListenerId};
pub use events::*;

/// An event that can be broadcast on an [`EventBus`].
///
/// Listeners register for a single kind; the bus only calls listeners whose
/// kind matches [`Event::kind`].
pub trait Event {
    type Kind: Copy + Eq + std::fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

pub trait EventHandler<E> {
    fn handle_event(&self, event: &E);
}

impl<E, F> EventHandler<E> for F
where
    F: Fn(&E),
{
    fn handle_event(&self, event: &E) {
        self(event)
    }
}
