//! Append-only transfer log
//!
//! Source of truth for every projection. Entries are never modified or
//! removed once appended.

use crate::types::{ParticipantId, Transfer};
use chrono::{DateTime, Utc};

/// Ordered sequence of completed transfers
#[derive(Debug, Default)]
pub struct TransferLog {
    transfers: Vec<Transfer>,
}

impl TransferLog {
    /// Create empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed transfer
    pub fn append(&mut self, transfer: Transfer) {
        self.transfers.push(transfer);
    }

    /// All transfers, oldest first
    pub fn iter(&self) -> std::slice::Iter<'_, Transfer> {
        self.transfers.iter()
    }

    /// The last `limit` transfers, oldest first
    pub fn tail(&self, limit: usize) -> &[Transfer] {
        let start = self.transfers.len().saturating_sub(limit);
        &self.transfers[start..]
    }

    /// Number of transfers sent by a participant
    pub fn given_count(&self, id: &ParticipantId) -> usize {
        self.transfers.iter().filter(|t| &t.from == id).count()
    }

    /// Number of transfers received by a participant
    pub fn received_count(&self, id: &ParticipantId) -> usize {
        self.transfers.iter().filter(|t| &t.to == id).count()
    }

    /// Number of transfers created strictly after `since`
    pub fn count_since(&self, since: DateTime<Utc>) -> usize {
        self.transfers.iter().filter(|t| t.created_at > since).count()
    }

    /// Number of transfers
    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}
