//! Kindness Chain Ledger Core
//!
//! In-memory social ledger: verified participants hold tokens, send them to
//! each other with a note, and the resulting transfer graph is queried as a
//! network and as an activity feed.
//!
//! # Architecture
//!
//! - **Event Sourcing**: Graph, feed and stats are derived from the transfer log
//! - **Single Lock**: One writer at a time keeps debit, credit and append atomic
//! - **Ordered Fan-out**: Subscribers see events in the order mutations happened
//!
//! # Invariants
//!
//! - Token conservation: transfers never change the total supply
//! - Non-negativity: no balance ever drops below zero
//! - Append-only: transfers are never modified or deleted
//! - Idempotent registration: a known key keeps its record and balance

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod balances;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod projection;
pub mod pulse;
pub mod registry;
pub mod seed;
pub mod transfer_log;
pub mod types;
pub mod validation;

// Re-exports
pub use config::Config;
pub use error::{Error, Result, ValidationError};
pub use ledger::Ledger;
pub use types::{
    CommunityPulse, FeedEntry, GraphEdge, GraphNode, Participant, ParticipantActivity,
    ParticipantId, ParticipantStats, Tokens, Transfer, TransferGraph, Trend,
};

pub use kindness_events::{Broadcaster, Event, EventKind, Subscription};
