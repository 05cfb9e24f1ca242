//! Main ledger service
//!
//! This module ties together the registry, balances, transfer log and event
//! broadcaster into one service object, constructed once per process and
//! shared by reference with request handlers.
//!
//! # Example
//!
//! ```no_run
//! use kindness_core::{Config, Ledger, ParticipantId};
//!
//! fn main() -> kindness_core::Result<()> {
//!     let ledger = Ledger::new(Config::default())?;
//!
//!     ledger.register("alien_001", "Luna");
//!     ledger.register("alien_002", "Kai");
//!
//!     let transfer = ledger.transfer(
//!         &ParticipantId::new("alien_001"),
//!         &ParticipantId::new("alien_002"),
//!         2,
//!         "Thanks for the late-night debugging",
//!         None,
//!     )?;
//!     assert_eq!(transfer.amount, 2);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! All state sits behind one `RwLock`. Registration and transfers take the
//! write lock, so the debit, credit and log append of a transfer are observed
//! together or not at all. The event ticket is reserved under that lock and
//! published after it is released: subscribers see events in mutation order
//! and may read the ledger from their handler.

use crate::{
    balances::Balances,
    connectivity,
    error::ValidationError,
    metrics::Metrics,
    projection, pulse,
    registry::Registry,
    transfer_log::TransferLog,
    types::{
        CommunityPulse, FeedEntry, Participant, ParticipantActivity, ParticipantId,
        ParticipantStats, Tokens, Transfer, TransferGraph,
    },
    validation, Config, Result,
};
use chrono::{DateTime, Duration, Utc};
use kindness_events::{Broadcaster, Event, EventHandler, EventKind, Subscription};
use parking_lot::RwLock;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// State guarded by the ledger lock
#[derive(Debug, Default)]
struct LedgerState {
    registry: Registry,
    balances: Balances,
    log: TransferLog,
}

/// Main ledger interface
pub struct Ledger {
    /// Registry, balances and log
    state: RwLock<LedgerState>,

    /// Fan-out for domain events
    events: Broadcaster,

    /// Configuration
    config: Config,

    /// Metrics collector
    metrics: Metrics,
}

impl Ledger {
    /// Create an empty ledger with its own broadcaster
    pub fn new(config: Config) -> Result<Self> {
        Self::with_broadcaster(config, Broadcaster::new())
    }

    /// Create an empty ledger publishing to an existing broadcaster
    pub fn with_broadcaster(config: Config, events: Broadcaster) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            state: RwLock::new(LedgerState::default()),
            events,
            config,
            metrics: Metrics::new()?,
        })
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Event broadcaster
    pub fn events(&self) -> &Broadcaster {
        &self.events
    }

    /// Register a participant, or return the existing record unchanged
    ///
    /// A new participant receives the starting balance and a
    /// `participant_joined` event is published. Re-registration does not
    /// touch the name or the balance.
    pub fn register(&self, id: impl Into<ParticipantId>, display_name: &str) -> Participant {
        self.register_at(id.into(), display_name, Utc::now())
    }

    pub(crate) fn register_at(
        &self,
        id: ParticipantId,
        display_name: &str,
        created_at: DateTime<Utc>,
    ) -> Participant {
        let mut state = self.state.write();

        let registration = state.registry.register(id, display_name, created_at);
        if !registration.is_new() {
            debug!(
                participant = %registration.participant().id,
                "Participant already registered"
            );
            return registration.into_participant();
        }
        let participant = registration.into_participant();

        state
            .balances
            .open(&participant.id, self.config.policy.starting_balance);
        let ticket = self.events.reserve();
        drop(state);

        self.metrics.record_registration();
        debug!(
            participant = %participant.id,
            starting_balance = self.config.policy.starting_balance,
            "Participant registered"
        );

        ticket.publish(EventKind::ParticipantJoined, &participant);
        participant
    }

    /// Look up a participant
    pub fn get(&self, id: &ParticipantId) -> Option<Participant> {
        self.state.read().registry.get(id).cloned()
    }

    /// All participants, in registration order
    pub fn list_all(&self) -> Vec<Participant> {
        self.state.read().registry.iter().cloned().collect()
    }

    /// Number of registered participants
    pub fn participant_count(&self) -> usize {
        self.state.read().registry.len()
    }

    /// Current balance (0 for unknown participants)
    pub fn balance(&self, id: &ParticipantId) -> Tokens {
        self.state.read().balances.get(id)
    }

    /// Sum of all balances
    pub fn total_supply(&self) -> Tokens {
        self.state.read().balances.total()
    }

    /// Move tokens from one participant to another
    ///
    /// On success the debit, credit and log append are applied together and
    /// a `transfer_completed` event carrying the feed entry is delivered to
    /// every subscriber before this returns. On failure nothing changes.
    pub fn transfer(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
        amount: Tokens,
        note: &str,
        settlement_ref: Option<String>,
    ) -> std::result::Result<Transfer, ValidationError> {
        self.transfer_at(from, to, amount, note, settlement_ref, Utc::now())
    }

    pub(crate) fn transfer_at(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
        amount: Tokens,
        note: &str,
        settlement_ref: Option<String>,
        created_at: DateTime<Utc>,
    ) -> std::result::Result<Transfer, ValidationError> {
        let mut state = self.state.write();

        let validated = validation::validate_transfer(
            &state.registry,
            &state.balances,
            &self.config.policy,
            from,
            to,
            amount,
            note,
        )
        .map(str::to_string);

        let note = match validated {
            Ok(note) => note,
            Err(e) => {
                drop(state);
                self.reject(from, to, amount, &e);
                return Err(e);
            }
        };

        if !state.balances.move_tokens(from, to, amount) {
            let e = ValidationError::InsufficientBalance {
                balance: state.balances.get(from),
                requested: amount,
            };
            drop(state);
            self.reject(from, to, amount, &e);
            return Err(e);
        }

        let transfer = Transfer {
            id: Uuid::now_v7(),
            from: from.clone(),
            to: to.clone(),
            amount,
            note,
            created_at,
            settlement_ref,
        };
        state.log.append(transfer.clone());

        let entry = projection::feed_entry(&transfer, &state.registry);
        let ticket = self.events.reserve();
        drop(state);

        self.metrics.record_transfer(amount);
        info!(
            transfer_id = %transfer.id,
            from = %transfer.from,
            to = %transfer.to,
            amount,
            "Transfer completed"
        );

        ticket.publish(EventKind::TransferCompleted, &entry);
        Ok(transfer)
    }

    fn reject(&self, from: &ParticipantId, to: &ParticipantId, amount: Tokens, error: &ValidationError) {
        self.metrics.record_rejection(error);
        warn!(
            from = %from,
            to = %to,
            amount,
            reason = error.code(),
            "Transfer rejected: {}",
            error
        );
    }

    /// Balance, transfer counts and eccentricity for a participant
    pub fn stats(&self, id: &ParticipantId) -> ParticipantStats {
        let state = self.state.read();

        ParticipantStats {
            balance: state.balances.get(id),
            transfers_given: state.log.given_count(id),
            transfers_received: state.log.received_count(id),
            eccentricity: connectivity::eccentricity(&state.log, id),
        }
    }

    /// Longest shortest-path reach of a participant in the transfer graph
    pub fn eccentricity(&self, id: &ParticipantId) -> usize {
        connectivity::eccentricity(&self.state.read().log, id)
    }

    /// The last `limit` transfers, most recent first
    pub fn feed(&self, limit: usize) -> Vec<FeedEntry> {
        let state = self.state.read();
        projection::feed(&state.log, &state.registry, limit)
    }

    /// Feed with the configured default length
    pub fn recent_feed(&self) -> Vec<FeedEntry> {
        self.feed(self.config.feed.default_limit)
    }

    /// Aggregated node/edge view of all transfers
    pub fn graph(&self) -> TransferGraph {
        let state = self.state.read();
        projection::graph(&state.log, &state.registry)
    }

    /// Every transfer, oldest first
    pub fn transfers(&self) -> Vec<Transfer> {
        self.state.read().log.iter().cloned().collect()
    }

    /// Number of completed transfers
    pub fn transfer_count(&self) -> usize {
        self.state.read().log.len()
    }

    /// Transfer counts per participant, in registration order
    pub fn activity(&self) -> Vec<ParticipantActivity> {
        let state = self.state.read();
        projection::activity(&state.log, &state.registry)
    }

    /// Transfers created within the last `window`
    pub fn recent_transfer_count(&self, window: Duration) -> usize {
        self.state.read().log.count_since(Utc::now() - window)
    }

    /// Community activity summary over the configured window
    pub fn pulse(&self) -> CommunityPulse {
        let window = Duration::seconds(self.config.pulse.window_secs as i64);
        let state = self.state.read();
        pulse::pulse(&state.log, &state.registry, Utc::now(), window)
    }

    /// Register a handler for subsequent events
    ///
    /// Handlers run on the writer's thread after the state lock is released.
    /// They may read the ledger. A registration or transfer made from a
    /// handler is applied at once; its event is delivered after the current
    /// one.
    pub fn subscribe<H>(&self, handler: H) -> Subscription
    where
        H: EventHandler + 'static,
    {
        self.events.subscribe(handler)
    }

    /// Register a closure for subsequent events
    pub fn subscribe_fn<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Event) -> kindness_events::Result<()> + Send + Sync + 'static,
    {
        self.events.subscribe_fn(handler)
    }

    /// Register a channel-backed subscriber for subsequent events
    pub fn subscribe_channel(&self) -> (Subscription, mpsc::UnboundedReceiver<Event>) {
        self.events.subscribe_channel()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Ledger")
            .field("service", &self.config.service_name)
            .field("participants", &state.registry.len())
            .field("transfers", &state.log.len())
            .field("events", &self.events)
            .finish()
    }
}
