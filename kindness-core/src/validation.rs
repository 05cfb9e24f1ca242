//! Transfer validation
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. sender registered
//! 2. recipient registered
//! 3. sender differs from recipient
//! 4. amount within policy range
//! 5. sender balance covers the amount
//! 6. note long enough after trimming
//! 7. note not too long after trimming

use crate::{
    balances::Balances,
    config::PolicyConfig,
    error::ValidationError,
    registry::Registry,
    types::{ParticipantId, Tokens},
};

/// Validate a transfer against current state; returns the trimmed note
pub fn validate_transfer<'n>(
    registry: &Registry,
    balances: &Balances,
    policy: &PolicyConfig,
    from: &ParticipantId,
    to: &ParticipantId,
    amount: Tokens,
    note: &'n str,
) -> Result<&'n str, ValidationError> {
    if !registry.contains(from) {
        return Err(ValidationError::SenderUnverified);
    }

    if !registry.contains(to) {
        return Err(ValidationError::RecipientUnverified);
    }

    if from == to {
        return Err(ValidationError::SelfTransferNotAllowed);
    }

    check_amount(policy, amount)?;

    let balance = balances.get(from);
    if balance < amount {
        return Err(ValidationError::InsufficientBalance {
            balance,
            requested: amount,
        });
    }

    check_note(policy, note)
}

/// Check the amount against the policy range
pub fn check_amount(policy: &PolicyConfig, amount: Tokens) -> Result<(), ValidationError> {
    if !(policy.min_amount..=policy.max_amount).contains(&amount) {
        return Err(ValidationError::AmountOutOfRange {
            amount,
            min: policy.min_amount,
            max: policy.max_amount,
        });
    }
    Ok(())
}

/// Trim the note and check its length in characters
pub fn check_note<'n>(policy: &PolicyConfig, note: &'n str) -> Result<&'n str, ValidationError> {
    let trimmed = note.trim();
    let len = trimmed.chars().count();

    if len < policy.min_note_len {
        return Err(ValidationError::NoteRequired {
            min_len: policy.min_note_len,
        });
    }

    if len > policy.max_note_len {
        return Err(ValidationError::NoteTooLong {
            max_len: policy.max_note_len,
        });
    }

    Ok(trimmed)
}
