//! Participant registry
//!
//! Owns identity records. Registration is idempotent: a known key returns
//! its existing record untouched.

use crate::types::{Participant, ParticipantId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Outcome of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// New record created
    Created(Participant),
    /// Key was already registered; existing record returned
    Existing(Participant),
}

impl Registration {
    /// The participant record, new or existing
    pub fn participant(&self) -> &Participant {
        match self {
            Registration::Created(p) | Registration::Existing(p) => p,
        }
    }

    /// Consume into the participant record
    pub fn into_participant(self) -> Participant {
        match self {
            Registration::Created(p) | Registration::Existing(p) => p,
        }
    }

    /// Whether a new record was created
    pub fn is_new(&self) -> bool {
        matches!(self, Registration::Created(_))
    }
}

/// Identity records in registration order
#[derive(Debug, Default)]
pub struct Registry {
    participants: HashMap<ParticipantId, Participant>,
    order: Vec<ParticipantId>,
}

impl Registry {
    /// Create empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant, or return the existing record
    pub fn register(
        &mut self,
        id: ParticipantId,
        display_name: &str,
        created_at: DateTime<Utc>,
    ) -> Registration {
        if let Some(existing) = self.participants.get(&id) {
            return Registration::Existing(existing.clone());
        }

        let participant = Participant {
            id: id.clone(),
            display_name: display_name.to_string(),
            verified: true,
            created_at,
        };

        self.order.push(id.clone());
        self.participants.insert(id, participant.clone());
        Registration::Created(participant)
    }

    /// Look up a participant
    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    /// Whether a participant is registered
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participants.contains_key(id)
    }

    /// Display name, or [`crate::types::ANONYMOUS`] if the record is missing
    pub fn display_name(&self, id: &ParticipantId) -> &str {
        self.participants
            .get(id)
            .map(|p| p.display_name.as_str())
            .unwrap_or(crate::types::ANONYMOUS)
    }

    /// All participants in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.order.iter().filter_map(|id| self.participants.get(id))
    }

    /// Number of participants
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
