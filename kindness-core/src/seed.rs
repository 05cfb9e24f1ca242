//! Demo seed data
//!
//! Eight participants and nine historical transfers, replayed through the
//! same validated primitives used at runtime so seeded state obeys every
//! ledger invariant.

use crate::{types::ParticipantId, Ledger, Result};
use chrono::{Duration, Utc};
use tracing::info;

/// Demo participants: (id, display name)
pub const DEMO_PARTICIPANTS: [(&str, &str); 8] = [
    ("alien_001", "Luna"),
    ("alien_002", "Kai"),
    ("alien_003", "Sage"),
    ("alien_004", "Nova"),
    ("alien_005", "River"),
    ("alien_006", "Ember"),
    ("alien_007", "Atlas"),
    ("alien_008", "Wren"),
];

/// Demo transfers: (from, to, amount, note), oldest first
pub const DEMO_TRANSFERS: [(&str, &str, i64, &str); 9] = [
    (
        "alien_001",
        "alien_002",
        2,
        "You helped me debug my code at 2am. That's real friendship.",
    ),
    (
        "alien_002",
        "alien_003",
        1,
        "Your talk on ZK proofs inspired me to learn more.",
    ),
    (
        "alien_003",
        "alien_005",
        2,
        "Thank you for sharing your lunch when I forgot mine!",
    ),
    (
        "alien_004",
        "alien_001",
        1,
        "Your smile made my day brighter. Simple but powerful.",
    ),
    (
        "alien_005",
        "alien_006",
        1,
        "For teaching me that kindness compounds.",
    ),
    (
        "alien_006",
        "alien_007",
        2,
        "You believed in my idea when nobody else did.",
    ),
    (
        "alien_007",
        "alien_004",
        1,
        "For the coffee. For the conversation. For being human.",
    ),
    (
        "alien_008",
        "alien_003",
        2,
        "You held the door open and asked how I was doing. Nobody does that.",
    ),
    (
        "alien_001",
        "alien_008",
        1,
        "Your energy is contagious. Never stop being you.",
    ),
];

/// Spacing between consecutive seeded transfers
const TRANSFER_SPACING_MINUTES: i64 = 5;

/// What a seed run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Participants registered
    pub participants: usize,

    /// Transfers applied
    pub transfers: usize,
}

/// Load the demo data set into an empty ledger
///
/// Does nothing if any participant is already registered.
pub fn load_demo(ledger: &Ledger) -> Result<SeedReport> {
    if ledger.participant_count() > 0 {
        info!("Ledger already populated, skipping seed data");
        return Ok(SeedReport::default());
    }

    let now = Utc::now();
    let joined_at = now - Duration::hours(1);

    for (id, name) in DEMO_PARTICIPANTS {
        ledger.register_at(ParticipantId::new(id), name, joined_at);
    }

    let count = DEMO_TRANSFERS.len() as i64;
    for (i, (from, to, amount, note)) in DEMO_TRANSFERS.into_iter().enumerate() {
        let created_at = now - Duration::minutes((count - i as i64) * TRANSFER_SPACING_MINUTES);
        ledger.transfer_at(
            &ParticipantId::new(from),
            &ParticipantId::new(to),
            amount,
            note,
            Some(format!("0xdemo{}", i)),
            created_at,
        )?;
    }

    let report = SeedReport {
        participants: DEMO_PARTICIPANTS.len(),
        transfers: DEMO_TRANSFERS.len(),
    };
    info!(
        participants = report.participants,
        transfers = report.transfers,
        "Seed data loaded"
    );
    Ok(report)
}
