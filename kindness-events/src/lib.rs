//! Kindness Chain event bus
//!
//! In-process publish/subscribe with:
//! - Ordered delivery: events reach subscribers in the order writers reserved them
//! - Failure isolation: a failing or panicking handler is evicted, never propagated
//! - Channel subscribers for streaming consumers
//! - Observability via Prometheus metrics

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, missing_debug_implementations)]

pub mod broadcaster;
pub mod error;
pub mod event;
pub mod metrics;
pub mod subscriber;
pub mod types;

pub use broadcaster::{Broadcaster, Delivery, Ticket};
pub use error::{Error, Result};
pub use event::Event;
pub use subscriber::{ChannelHandler, EventHandler, Subscription};
pub use types::{EventKind, SubscriberId};
