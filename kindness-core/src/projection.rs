//! Read projections over the transfer log
//!
//! Pure functions of the log and the registry, recomputed on every call.

use crate::{
    registry::Registry,
    transfer_log::TransferLog,
    types::{FeedEntry, GraphEdge, GraphNode, ParticipantActivity, ParticipantId, Transfer, TransferGraph},
};
use std::collections::HashMap;

/// Feed view of one transfer, with display names resolved now
pub fn feed_entry(transfer: &Transfer, registry: &Registry) -> FeedEntry {
    FeedEntry {
        id: transfer.id,
        from_name: registry.display_name(&transfer.from).to_string(),
        to_name: registry.display_name(&transfer.to).to_string(),
        amount: transfer.amount,
        note: transfer.note.clone(),
        created_at: transfer.created_at,
    }
}

/// The last `limit` transfers, most recent first
pub fn feed(log: &TransferLog, registry: &Registry, limit: usize) -> Vec<FeedEntry> {
    log.tail(limit)
        .iter()
        .rev()
        .map(|transfer| feed_entry(transfer, registry))
        .collect()
}

/// Aggregated node/edge view
///
/// Nodes follow registration order. Edges follow the order in which each
/// sender→recipient pair first appears; a later transfer on the same pair
/// adds to the amount and replaces the note and timestamp.
pub fn graph(log: &TransferLog, registry: &Registry) -> TransferGraph {
    let mut given: HashMap<&ParticipantId, (i64, usize)> = HashMap::new();
    let mut received: HashMap<&ParticipantId, (i64, usize)> = HashMap::new();
    let mut edge_index: HashMap<(&ParticipantId, &ParticipantId), usize> = HashMap::new();
    let mut edges: Vec<GraphEdge> = Vec::new();

    for transfer in log.iter() {
        let sent = given.entry(&transfer.from).or_default();
        sent.0 += transfer.amount;
        sent.1 += 1;

        let got = received.entry(&transfer.to).or_default();
        got.0 += transfer.amount;
        got.1 += 1;

        match edge_index.get(&(&transfer.from, &transfer.to)) {
            Some(&index) => {
                let edge = &mut edges[index];
                edge.amount += transfer.amount;
                edge.note = transfer.note.clone();
                edge.created_at = transfer.created_at;
            }
            None => {
                edge_index.insert((&transfer.from, &transfer.to), edges.len());
                edges.push(GraphEdge {
                    source: transfer.from.clone(),
                    target: transfer.to.clone(),
                    amount: transfer.amount,
                    note: transfer.note.clone(),
                    created_at: transfer.created_at,
                });
            }
        }
    }

    let nodes = registry
        .iter()
        .map(|participant| {
            let (total_given, given_count) = given.get(&participant.id).copied().unwrap_or_default();
            let (total_received, received_count) =
                received.get(&participant.id).copied().unwrap_or_default();

            GraphNode {
                id: participant.id.clone(),
                name: participant.display_name.clone(),
                total_given,
                total_received,
                transfer_count: given_count + received_count,
                verified: participant.verified,
            }
        })
        .collect();

    TransferGraph { nodes, edges }
}

/// Transfer counts per participant, in registration order
pub fn activity(log: &TransferLog, registry: &Registry) -> Vec<ParticipantActivity> {
    let mut given: HashMap<&ParticipantId, usize> = HashMap::new();
    let mut received: HashMap<&ParticipantId, usize> = HashMap::new();
    for transfer in log.iter() {
        *given.entry(&transfer.from).or_default() += 1;
        *received.entry(&transfer.to).or_default() += 1;
    }

    registry
        .iter()
        .map(|participant| ParticipantActivity {
            id: participant.id.clone(),
            display_name: participant.display_name.clone(),
            transfers_given: given.get(&participant.id).copied().unwrap_or(0),
            transfers_received: received.get(&participant.id).copied().unwrap_or(0),
        })
        .collect()
}
