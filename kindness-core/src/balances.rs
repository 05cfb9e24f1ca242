//! Per-participant token balances
//!
//! Balances change only through [`Balances::move_tokens`], which debits and
//! credits as one step. Total supply changes only when an account is opened.

use crate::types::{ParticipantId, Tokens};
use std::collections::HashMap;

/// Balance table
#[derive(Debug, Default)]
pub struct Balances {
    accounts: HashMap<ParticipantId, Tokens>,
}

impl Balances {
    /// Create empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an account with its starting balance; existing accounts are left alone
    pub fn open(&mut self, id: &ParticipantId, starting_balance: Tokens) -> bool {
        if self.accounts.contains_key(id) {
            return false;
        }
        self.accounts.insert(id.clone(), starting_balance);
        true
    }

    /// Current balance (0 for unknown accounts)
    pub fn get(&self, id: &ParticipantId) -> Tokens {
        self.accounts.get(id).copied().unwrap_or(0)
    }

    /// Move tokens between two accounts
    ///
    /// Returns `false` without touching either account if the debit would
    /// overdraw the sender or either account is missing.
    pub fn move_tokens(&mut self, from: &ParticipantId, to: &ParticipantId, amount: Tokens) -> bool {
        if amount <= 0 || from == to || !self.accounts.contains_key(to) {
            return false;
        }

        let Some(sender) = self.accounts.get_mut(from) else {
            return false;
        };
        if *sender < amount {
            return false;
        }
        *sender -= amount;

        if let Some(recipient) = self.accounts.get_mut(to) {
            *recipient += amount;
        }
        true
    }

    /// Sum of all balances
    pub fn total(&self) -> Tokens {
        self.accounts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ParticipantId {
        ParticipantId::new(s)
    }

    #[test]
    fn test_open_once() {
        let mut balances = Balances::new();
        assert!(balances.open(&id("a"), 5));
        assert!(!balances.open(&id("a"), 100));
        assert_eq!(balances.get(&id("a")), 5);
        assert_eq!(balances.get(&id("missing")), 0);
    }

    #[test]
    fn test_move_conserves_total() {
        let mut balances = Balances::new();
        balances.open(&id("a"), 5);
        balances.open(&id("b"), 5);

        assert!(balances.move_tokens(&id("a"), &id("b"), 3));
        assert_eq!(balances.get(&id("a")), 2);
        assert_eq!(balances.get(&id("b")), 8);
        assert_eq!(balances.total(), 10);
    }

    #[test]
    fn test_move_rejects_overdraft_without_mutation() {
        let mut balances = Balances::new();
        balances.open(&id("a"), 2);
        balances.open(&id("b"), 5);

        assert!(!balances.move_tokens(&id("a"), &id("b"), 3));
        assert!(!balances.move_tokens(&id("a"), &id("ghost"), 1));
        assert!(!balances.move_tokens(&id("a"), &id("a"), 1));
        assert_eq!(balances.get(&id("a")), 2);
        assert_eq!(balances.get(&id("b")), 5);
    }
}
