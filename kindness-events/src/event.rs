//! Event envelope for fan-out

use crate::types::EventKind;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event ID (UUIDv7 for ordering)
    pub id: Uuid,

    /// Delivery sequence number, dense and increasing per broadcaster
    pub sequence: u64,

    /// Event kind
    pub kind: EventKind,

    /// Payload (JSON-serialized)
    pub payload: serde_json::Value,

    /// Publication timestamp
    pub published_at: DateTime<Utc>,
}

impl Event {
    /// Create new event
    pub fn new(sequence: u64, kind: EventKind, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            sequence,
            kind,
            payload,
            published_at: Utc::now(),
        }
    }

    /// Decode the payload into a concrete type
    pub fn payload_as<T: DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_creation() {
        let event = Event::new(7, EventKind::TransferCompleted, json!({"amount": 3}));

        assert_eq!(event.sequence, 7);
        assert_eq!(event.kind, EventKind::TransferCompleted);
        assert_eq!(event.payload["amount"], 3);
    }

    #[test]
    fn test_payload_as() {
        #[derive(Deserialize)]
        struct Joined {
            id: String,
        }

        let event = Event::new(0, EventKind::ParticipantJoined, json!({"id": "alien_001"}));
        let joined: Joined = event.payload_as().unwrap();
        assert_eq!(joined.id, "alien_001");

        let wrong: crate::Result<Vec<u8>> = event.payload_as();
        assert!(wrong.is_err());
    }
}
