//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `kindness_transfers_total` - Completed transfers
//! - `kindness_tokens_transferred_total` - Tokens moved by completed transfers
//! - `kindness_transfers_rejected_total` - Rejected transfers by reason
//! - `kindness_participants` - Registered participants

use crate::error::ValidationError;
use crate::types::Tokens;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Each collector owns its registry, so several ledgers can live in one
/// process (tests, embedded use) without name clashes.
#[derive(Clone)]
pub struct Metrics {
    /// Completed transfers
    pub transfers_total: IntCounter,

    /// Tokens moved
    pub tokens_transferred: IntCounter,

    /// Rejected transfers by reason code
    pub transfers_rejected: IntCounterVec,

    /// Registered participants
    pub participants: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let transfers_total =
            IntCounter::new("kindness_transfers_total", "Completed transfers")?;
        registry.register(Box::new(transfers_total.clone()))?;

        let tokens_transferred = IntCounter::new(
            "kindness_tokens_transferred_total",
            "Tokens moved by completed transfers",
        )?;
        registry.register(Box::new(tokens_transferred.clone()))?;

        let transfers_rejected = IntCounterVec::new(
            Opts::new(
                "kindness_transfers_rejected_total",
                "Rejected transfers by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(transfers_rejected.clone()))?;

        let participants = IntGauge::new("kindness_participants", "Registered participants")?;
        registry.register(Box::new(participants.clone()))?;

        Ok(Self {
            transfers_total,
            tokens_transferred,
            transfers_rejected,
            participants,
            registry,
        })
    }

    /// Record a completed transfer
    pub fn record_transfer(&self, amount: Tokens) {
        self.transfers_total.inc();
        self.tokens_transferred.inc_by(amount.max(0) as u64);
    }

    /// Record a rejected transfer
    pub fn record_rejection(&self, error: &ValidationError) {
        self.transfers_rejected
            .with_label_values(&[error.code()])
            .inc();
    }

    /// Record a new participant
    pub fn record_registration(&self) {
        self.participants.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("transfers_total", &self.transfers_total.get())
            .field("tokens_transferred", &self.tokens_transferred.get())
            .field("participants", &self.participants.get())
            .finish()
    }
}
