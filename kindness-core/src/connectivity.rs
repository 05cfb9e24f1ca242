//! Connectivity analysis over the transfer graph
//!
//! The log is read as an undirected simple graph: a transfer in either
//! direction connects two participants, and repeated transfers between the
//! same pair collapse into a single edge.

use crate::{transfer_log::TransferLog, types::ParticipantId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Undirected adjacency built from the log
#[derive(Debug, Default)]
pub struct Adjacency<'a> {
    neighbours: HashMap<&'a ParticipantId, HashSet<&'a ParticipantId>>,
}

impl<'a> Adjacency<'a> {
    /// Build adjacency from every transfer in the log
    pub fn from_log(log: &'a TransferLog) -> Self {
        let mut neighbours: HashMap<&ParticipantId, HashSet<&ParticipantId>> = HashMap::new();
        for transfer in log.iter() {
            neighbours.entry(&transfer.from).or_default().insert(&transfer.to);
            neighbours.entry(&transfer.to).or_default().insert(&transfer.from);
        }
        Self { neighbours }
    }

    /// Distinct neighbours of a participant
    pub fn neighbours(&self, id: &ParticipantId) -> impl Iterator<Item = &'a ParticipantId> + '_ {
        self.neighbours.get(id).into_iter().flatten().copied()
    }

    /// Longest shortest-path distance from `start` to any reachable participant
    ///
    /// Breadth-first; each participant is expanded at most once. Returns 0 for
    /// a participant with no transfers or one that does not exist.
    pub fn eccentricity(&self, start: &ParticipantId) -> usize {
        let mut visited: HashSet<&ParticipantId> = HashSet::new();
        let mut queue: VecDeque<(&ParticipantId, usize)> = VecDeque::new();
        let mut max_depth = 0;

        visited.insert(start);
        queue.push_back((start, 0));

        while let Some((id, depth)) = queue.pop_front() {
            max_depth = max_depth.max(depth);

            for next in self.neighbours(id) {
                if visited.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        max_depth
    }
}

/// Eccentricity of `id` in the undirected transfer graph
pub fn eccentricity(log: &TransferLog, id: &ParticipantId) -> usize {
    Adjacency::from_log(log).eccentricity(id)
}
