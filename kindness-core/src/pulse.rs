//! Community pulse: a small summary of recent activity

use crate::{
    projection,
    registry::Registry,
    transfer_log::TransferLog,
    types::{CommunityPulse, Trend},
};
use chrono::{DateTime, Duration, Utc};

/// Trend for a number of recent transfers
pub fn trend_for(recent_transfers: usize) -> Trend {
    match recent_transfers {
        n if n > 5 => Trend::Rising,
        n if n > 2 => Trend::Stable,
        _ => Trend::Falling,
    }
}

/// Activity score capped at 100
pub fn score_for(recent_transfers: usize, participant_count: usize) -> u32 {
    let raw = recent_transfers
        .saturating_mul(8)
        .saturating_add(participant_count.saturating_mul(3));
    raw.min(100) as u32
}

/// Summarise activity in the window ending at `now`
pub fn pulse(
    log: &TransferLog,
    registry: &Registry,
    now: DateTime<Utc>,
    window: Duration,
) -> CommunityPulse {
    let recent_transfers = log.count_since(now - window);
    let participant_count = registry.len();

    // min_by_key keeps the first minimum, i.e. the earliest registered.
    let suggested_recipient = projection::activity(log, registry)
        .into_iter()
        .min_by_key(|activity| activity.transfers_received)
        .map(|activity| activity.id);

    CommunityPulse {
        recent_transfers,
        participant_count,
        score: score_for(recent_transfers, participant_count),
        trend: trend_for(recent_transfers),
        suggested_recipient,
        computed_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParticipantId, Transfer};
    use uuid::Uuid;

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(trend_for(0), Trend::Falling);
        assert_eq!(trend_for(2), Trend::Falling);
        assert_eq!(trend_for(3), Trend::Stable);
        assert_eq!(trend_for(5), Trend::Stable);
        assert_eq!(trend_for(6), Trend::Rising);
    }

    #[test]
    fn test_score_is_capped() {
        assert_eq!(score_for(1, 2), 14);
        assert_eq!(score_for(10, 10), 100);
        assert_eq!(score_for(usize::MAX, usize::MAX), 100);
    }

    #[test]
    fn test_pulse_counts_only_window_and_suggests_least_received() {
        let now = Utc::now();
        let mut registry = Registry::new();
        for id in ["a", "b", "c"] {
            registry.register(ParticipantId::new(id), id, now);
        }

        let mut log = TransferLog::new();
        for (to, age_minutes) in [("b", 30), ("b", 1), ("a", 2)] {
            log.append(Transfer {
                id: Uuid::now_v7(),
                from: ParticipantId::new(if to == "a" { "b" } else { "a" }),
                to: ParticipantId::new(to),
                amount: 1,
                note: "thank you".to_string(),
                created_at: now - Duration::minutes(age_minutes),
                settlement_ref: None,
            });
        }

        let pulse = pulse(&log, &registry, now, Duration::minutes(5));
        assert_eq!(pulse.recent_transfers, 2);
        assert_eq!(pulse.participant_count, 3);
        assert_eq!(pulse.score, 25);
        assert_eq!(pulse.trend, Trend::Falling);
        assert_eq!(pulse.suggested_recipient, Some(ParticipantId::new("c")));
    }

    #[test]
    fn test_pulse_on_empty_registry() {
        let pulse = pulse(&TransferLog::new(), &Registry::new(), Utc::now(), Duration::minutes(5));
        assert_eq!(pulse.suggested_recipient, None);
        assert_eq!(pulse.score, 0);
    }
}
