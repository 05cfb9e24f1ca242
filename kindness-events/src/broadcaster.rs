//! Process-wide publish/subscribe fan-out
//!
//! # Ordering
//!
//! Every publication takes a [`Ticket`] carrying a sequence number. Tickets
//! are delivered strictly in sequence order, one at a time:
//!
//! ```text
//!   writer A ──reserve()──► #4 ─┐            ┌─► handler 1
//!   writer B ──reserve()──► #5 ─┼─ turnstile ┼─► handler 2
//!   writer C ──reserve()──► #6 ─┘  (4,5,6)   └─► handler 3
//! ```
//!
//! A writer reserves its ticket while it still holds its own state lock, so
//! the delivery order matches the order in which mutations were applied. It
//! then releases that lock before publishing, which lets handlers read the
//! writer's state without deadlocking.
//!
//! # Re-entrant publishing
//!
//! A handler may trigger another publication on the same broadcaster (for
//! example by registering a participant from inside a transfer handler). That
//! event cannot wait for its turn while the current one is still being
//! delivered on the same thread, so it is queued and delivered right after the
//! current event finishes. The nested `publish` returns immediately with
//! [`Delivery::deferred`] set.
//!
//! # Failure isolation
//!
//! A handler that returns an error or panics is evicted. Its failure is
//! logged and never reaches the publisher, and the remaining handlers still
//! receive the event.

use crate::{
    event::Event,
    metrics::{EVENT_DELIVERY_TOTAL, EVENT_PUBLISH_TOTAL, SUBSCRIBERS_ACTIVE},
    subscriber::{ChannelHandler, EventHandler, Subscription},
    types::{EventKind, SubscriberId},
    Result,
};
use parking_lot::{Condvar, Mutex, RwLock};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Outcome of a single publication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Sequence number of the event
    pub sequence: u64,

    /// Handlers that accepted the event
    pub delivered: usize,

    /// Handlers evicted because they failed on this event
    pub evicted: Vec<SubscriberId>,

    /// Published from inside a delivery; queued behind the current event
    pub deferred: bool,
}

/// Event waiting for its delivery turn; `None` only releases the slot
struct Pending {
    sequence: u64,
    event: Option<(EventKind, serde_json::Value)>,
}

/// Delivery in progress on the current thread
struct Frame {
    bus: usize,
    deferred: Vec<Pending>,
}

thread_local! {
    static DELIVERING: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Queue `pending` behind a delivery of `bus` running on this thread
///
/// Hands `pending` back when no such delivery is in progress.
fn defer(bus: usize, pending: Pending) -> Option<Pending> {
    DELIVERING.with(|frames| {
        let mut frames = frames.borrow_mut();
        match frames.iter_mut().rev().find(|frame| frame.bus == bus) {
            Some(frame) => {
                frame.deferred.push(pending);
                None
            }
            None => Some(pending),
        }
    })
}

struct SubscriberEntry {
    id: SubscriberId,
    handler: Box<dyn EventHandler>,
    alive: AtomicBool,
}

impl SubscriberEntry {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Mark dead; `true` on the first call
    fn retire(&self) -> bool {
        let was_alive = self.alive.swap(false, Ordering::AcqRel);
        if was_alive {
            SUBSCRIBERS_ACTIVE.dec();
        }
        was_alive
    }

    fn handle(&self, event: &Event) -> Result<()> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.handler.handle(event))) {
            Ok(result) => result,
            Err(_) => Err(crate::Error::Handler("handler panicked".to_string())),
        }
    }
}

/// State shared between the broadcaster, its clones, tickets and subscriptions
pub(crate) struct Shared {
    subscribers: RwLock<Vec<Arc<SubscriberEntry>>>,
    next_subscriber: AtomicU64,
    issued: AtomicU64,
    turn: Mutex<u64>,
    turn_changed: Condvar,
}

impl Shared {
    fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_subscriber: AtomicU64::new(0),
            issued: AtomicU64::new(0),
            turn: Mutex::new(0),
            turn_changed: Condvar::new(),
        }
    }

    /// Remove a subscriber; `false` if it was not registered
    pub(crate) fn remove(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write();
        let Some(position) = subscribers.iter().position(|entry| entry.id == id) else {
            return false;
        };
        let entry = subscribers.remove(position);
        drop(subscribers);

        entry.retire();
        true
    }

    pub(crate) fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.read().iter().any(|entry| entry.id == id)
    }

    /// Block until `sequence` is the next ticket to deliver
    fn take_turn(&self, sequence: u64) -> Turn<'_> {
        let mut turn = self.turn.lock();
        while *turn != sequence {
            self.turn_changed.wait(&mut turn);
        }
        Turn { shared: self }
    }

    /// Deliver `first`, then anything its handlers published re-entrantly
    fn deliver_in_order(&self, bus: usize, first: Pending) -> Delivery {
        let mut queue = VecDeque::from([first]);
        let mut report = None;

        while let Some(pending) = queue.pop_front() {
            let turn = self.take_turn(pending.sequence);
            DELIVERING.with(|frames| {
                frames.borrow_mut().push(Frame {
                    bus,
                    deferred: Vec::new(),
                })
            });

            let delivery = match pending.event {
                Some((kind, payload)) => self.deliver(&Event::new(pending.sequence, kind, payload)),
                None => Delivery {
                    sequence: pending.sequence,
                    ..Delivery::default()
                },
            };

            let frame = DELIVERING.with(|frames| frames.borrow_mut().pop());
            drop(turn);

            if let Some(frame) = frame {
                queue.extend(frame.deferred);
            }
            report.get_or_insert(delivery);
        }

        report.unwrap_or_default()
    }

    fn deliver(&self, event: &Event) -> Delivery {
        // Handlers added after this point do not see the in-flight event.
        let snapshot: Vec<Arc<SubscriberEntry>> = self.subscribers.read().clone();
        let kind = event.kind.as_str();
        EVENT_PUBLISH_TOTAL.with_label_values(&[kind]).inc();

        let mut delivery = Delivery {
            sequence: event.sequence,
            ..Delivery::default()
        };

        for entry in snapshot {
            if !entry.is_alive() {
                continue;
            }

            match entry.handle(event) {
                Ok(()) => {
                    delivery.delivered += 1;
                    EVENT_DELIVERY_TOTAL
                        .with_label_values(&[kind, "delivered"])
                        .inc();
                }
                Err(e) => {
                    warn!(
                        subscriber = %entry.id,
                        event_kind = kind,
                        sequence = event.sequence,
                        "Subscriber failed, evicting: {}",
                        e
                    );
                    EVENT_DELIVERY_TOTAL
                        .with_label_values(&[kind, "failed"])
                        .inc();
                    if self.remove(entry.id) {
                        delivery.evicted.push(entry.id);
                    }
                }
            }
        }

        debug!(
            event_kind = kind,
            sequence = event.sequence,
            delivered = delivery.delivered,
            "Event delivered"
        );
        delivery
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        for entry in self.subscribers.get_mut().drain(..) {
            entry.retire();
        }
    }
}

/// Holds the delivery turn; passes it on when dropped
struct Turn<'a> {
    shared: &'a Shared,
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        let mut turn = self.shared.turn.lock();
        *turn += 1;
        self.shared.turn_changed.notify_all();
    }
}

/// Reserved slot in the delivery order
///
/// Obtained from [`Broadcaster::reserve`]. Every later ticket waits until this
/// one is published or dropped, so keep the window between the two short.
#[must_use = "an unpublished ticket still occupies its delivery slot"]
pub struct Ticket {
    shared: Arc<Shared>,
    sequence: u64,
    consumed: bool,
}

impl Ticket {
    /// Sequence number of this slot
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Publish an event in this ticket's slot
    ///
    /// Blocks until every earlier ticket has been delivered. Called from a
    /// handler of the same broadcaster, it queues the event behind the
    /// current delivery and returns at once. A payload that cannot be
    /// serialized is logged and skipped; the slot is still released.
    pub fn publish<P>(mut self, kind: EventKind, payload: &P) -> Delivery
    where
        P: Serialize + ?Sized,
    {
        self.consumed = true;

        let event = match serde_json::to_value(payload) {
            Ok(payload) => Some((kind, payload)),
            Err(e) => {
                error!(
                    event_kind = kind.as_str(),
                    sequence = self.sequence,
                    "Failed to serialize event payload: {}",
                    e
                );
                None
            }
        };

        let pending = Pending {
            sequence: self.sequence,
            event,
        };
        match defer(self.bus(), pending) {
            Some(pending) => self.shared.deliver_in_order(self.bus(), pending),
            None => {
                debug!(
                    event_kind = kind.as_str(),
                    sequence = self.sequence,
                    "Re-entrant publish queued behind current delivery"
                );
                Delivery {
                    sequence: self.sequence,
                    deferred: true,
                    ..Delivery::default()
                }
            }
        }
    }

    fn bus(&self) -> usize {
        Arc::as_ptr(&self.shared) as usize
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if self.consumed {
            return;
        }

        let pending = Pending {
            sequence: self.sequence,
            event: None,
        };
        if let Some(pending) = defer(self.bus(), pending) {
            self.shared.deliver_in_order(self.bus(), pending);
        }
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("sequence", &self.sequence)
            .field("consumed", &self.consumed)
            .finish()
    }
}

/// Event broadcaster
///
/// Cheap to clone; clones share subscribers and delivery order.
#[derive(Clone)]
pub struct Broadcaster {
    shared: Arc<Shared>,
}

impl Broadcaster {
    /// Create a broadcaster with no subscribers
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::new()),
        }
    }

    /// Register a handler for every subsequently published event
    pub fn subscribe<H>(&self, handler: H) -> Subscription
    where
        H: EventHandler + 'static,
    {
        let id = SubscriberId(self.shared.next_subscriber.fetch_add(1, Ordering::Relaxed));
        let entry = Arc::new(SubscriberEntry {
            id,
            handler: Box::new(handler),
            alive: AtomicBool::new(true),
        });

        self.shared.subscribers.write().push(entry);
        SUBSCRIBERS_ACTIVE.inc();
        debug!(subscriber = %id, "Subscriber registered");

        Subscription::new(id, Arc::downgrade(&self.shared))
    }

    /// Register a closure as a handler
    pub fn subscribe_fn<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
    {
        self.subscribe(handler)
    }

    /// Register a channel-backed subscriber
    pub fn subscribe_channel(&self) -> (Subscription, mpsc::UnboundedReceiver<Event>) {
        let (handler, receiver) = ChannelHandler::new();
        (self.subscribe(handler), receiver)
    }

    /// Reserve the next slot in the delivery order
    pub fn reserve(&self) -> Ticket {
        Ticket {
            shared: Arc::clone(&self.shared),
            sequence: self.shared.issued.fetch_add(1, Ordering::AcqRel),
            consumed: false,
        }
    }

    /// Publish an event to every live subscriber, in subscription order
    pub fn publish<P>(&self, kind: EventKind, payload: &P) -> Delivery
    where
        P: Serialize + ?Sized,
    {
        self.reserve().publish(kind, payload)
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.read().len()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.subscriber_count())
            .field("issued", &self.shared.issued.load(Ordering::Relaxed))
            .finish()
    }
}
