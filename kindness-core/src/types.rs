//! Core types for the ledger
//!
//! Stored records ([`Participant`], [`Transfer`]) are immutable once created.
//! Everything else here is a read projection recomputed on demand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Token amount
pub type Tokens = i64;

/// Display name used when a referenced participant record is missing
pub const ANONYMOUS: &str = "Anonymous";

/// Participant identity key, as issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create new participant ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Verified participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Identity key
    pub id: ParticipantId,

    /// Display name (may be empty; the boundary decides on fallbacks)
    pub display_name: String,

    /// Always true: unverified participants never enter the registry
    pub verified: bool,

    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// Completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Unique transfer ID (UUIDv7 for time-ordering)
    pub id: Uuid,

    /// Sender
    pub from: ParticipantId,

    /// Recipient
    pub to: ParticipantId,

    /// Tokens moved
    pub amount: Tokens,

    /// Note explaining the transfer (stored trimmed)
    pub note: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Opaque settlement reference from the payment rail, if any
    pub settlement_ref: Option<String>,
}

/// Transfer as shown in the activity feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Transfer ID
    pub id: Uuid,

    /// Sender display name
    pub from_name: String,

    /// Recipient display name
    pub to_name: String,

    /// Tokens moved
    pub amount: Tokens,

    /// Note
    pub note: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Per-participant node of the transfer graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Participant ID
    pub id: ParticipantId,

    /// Display name
    pub name: String,

    /// Sum of amounts sent
    pub total_given: Tokens,

    /// Sum of amounts received
    pub total_received: Tokens,

    /// Transfers sent plus transfers received
    pub transfer_count: usize,

    /// Verified flag
    pub verified: bool,
}

/// Aggregated sender→recipient edge of the transfer graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Sender
    pub source: ParticipantId,

    /// Recipient
    pub target: ParticipantId,

    /// Cumulative amount over every transfer on this pair
    pub amount: Tokens,

    /// Note of the most recent transfer on this pair
    pub note: String,

    /// Timestamp of the most recent transfer on this pair
    pub created_at: DateTime<Utc>,
}

/// Aggregated network view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferGraph {
    /// One node per registered participant
    pub nodes: Vec<GraphNode>,

    /// One edge per ordered pair with at least one transfer
    pub edges: Vec<GraphEdge>,
}

impl TransferGraph {
    /// Find the edge for an ordered pair
    pub fn edge(&self, source: &ParticipantId, target: &ParticipantId) -> Option<&GraphEdge> {
        self.edges
            .iter()
            .find(|edge| &edge.source == source && &edge.target == target)
    }

    /// Find the node for a participant
    pub fn node(&self, id: &ParticipantId) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}

/// Per-participant statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStats {
    /// Current balance (0 for unknown participants)
    pub balance: Tokens,

    /// Number of transfers sent
    pub transfers_given: usize,

    /// Number of transfers received
    pub transfers_received: usize,

    /// Longest shortest-path reach in the undirected transfer graph
    pub eccentricity: usize,
}

/// Activity counts for one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantActivity {
    /// Participant ID
    pub id: ParticipantId,

    /// Display name
    pub display_name: String,

    /// Number of transfers sent
    pub transfers_given: usize,

    /// Number of transfers received
    pub transfers_received: usize,
}

/// Direction of recent community activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// More than five transfers in the window
    Rising,
    /// Three to five transfers in the window
    Stable,
    /// Two or fewer transfers in the window
    Falling,
}

/// Snapshot of community activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityPulse {
    /// Transfers created inside the pulse window
    pub recent_transfers: usize,

    /// Registered participants
    pub participant_count: usize,

    /// Activity score, 0-100
    pub score: u32,

    /// Activity trend
    pub trend: Trend,

    /// Participant who has received the fewest transfers
    pub suggested_recipient: Option<ParticipantId>,

    /// When the snapshot was taken
    pub computed_at: DateTime<Utc>,
}
