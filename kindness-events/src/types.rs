//! Type definitions for the event bus

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of domain event carried by the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A participant registered for the first time
    ParticipantJoined,
    /// A transfer passed validation and was appended to the log
    TransferCompleted,
}

impl EventKind {
    /// Wire name of this event kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ParticipantJoined => "participant_joined",
            EventKind::TransferCompleted => "transfer_completed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier handed out to each subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_names() {
        assert_eq!(EventKind::ParticipantJoined.as_str(), "participant_joined");
        assert_eq!(EventKind::TransferCompleted.to_string(), "transfer_completed");
        assert_eq!(SubscriberId(3).to_string(), "sub-3");
    }

    #[test]
    fn test_event_kind_serializes_as_wire_name() {
        let json = serde_json::to_string(&EventKind::ParticipantJoined).unwrap();
        assert_eq!(json, "\"participant_joined\"");
    }
}
