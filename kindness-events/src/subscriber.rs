//! Subscriber side of the bus: handlers and subscription handles

use crate::{broadcaster::Shared, event::Event, types::SubscriberId, Error, Result};
use std::sync::Weak;
use tokio::sync::mpsc;

/// Event handler trait
///
/// Handlers run synchronously on the publishing thread, so they must return
/// quickly. Anything a handler publishes on the same bus is queued and
/// delivered after the current event. Returning an error, or panicking, marks
/// the handler dead and it is removed from the bus.
pub trait EventHandler: Send + Sync {
    /// Handle an event
    fn handle(&self, event: &Event) -> Result<()>;
}

impl<F> EventHandler for F
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    fn handle(&self, event: &Event) -> Result<()> {
        self(event)
    }
}

/// Handler that forwards every event into an unbounded channel
///
/// Gives each consumer its own queue so slow readers never stall the writer.
/// Once the receiver is dropped the next delivery fails and the subscriber is
/// evicted.
#[derive(Debug)]
pub struct ChannelHandler {
    sender: mpsc::UnboundedSender<Event>,
}

impl ChannelHandler {
    /// Create a handler together with the receiving end
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventHandler for ChannelHandler {
    fn handle(&self, event: &Event) -> Result<()> {
        self.sender
            .send(event.clone())
            .map_err(|_| Error::ChannelClosed)
    }
}

/// Capability to deregister a subscriber
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Debug, Clone)]
pub struct Subscription {
    id: SubscriberId,
    shared: Weak<Shared>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, shared: Weak<Shared>) -> Self {
        Self { id, shared }
    }

    /// Subscriber ID
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Deregister the subscriber
    ///
    /// Returns `false` if it was already gone (unsubscribed, evicted, or the
    /// broadcaster was dropped).
    pub fn unsubscribe(&self) -> bool {
        match self.shared.upgrade() {
            Some(shared) => shared.remove(self.id),
            None => false,
        }
    }

    /// Whether the subscriber is still registered
    pub fn is_active(&self) -> bool {
        self.shared
            .upgrade()
            .map(|shared| shared.contains(self.id))
            .unwrap_or(false)
    }
}
