//! Error types for the ledger

use crate::types::Tokens;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a transfer is rejected
///
/// Variants are listed in the order they are checked; the first failing
/// check wins. A rejected transfer leaves all state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Sender is not a registered participant
    #[error("Sender not verified")]
    SenderUnverified,

    /// Recipient is not a registered participant
    #[error("Recipient not verified")]
    RecipientUnverified,

    /// Sender and recipient are the same participant
    #[error("Cannot transfer to yourself")]
    SelfTransferNotAllowed,

    /// Amount outside the allowed range
    #[error("Amount must be {min}-{max}, got {amount}")]
    AmountOutOfRange {
        /// Requested amount
        amount: Tokens,
        /// Smallest allowed amount
        min: Tokens,
        /// Largest allowed amount
        max: Tokens,
    },

    /// Sender balance below the requested amount
    #[error("Insufficient balance: have {balance}, need {requested}")]
    InsufficientBalance {
        /// Sender balance at validation time
        balance: Tokens,
        /// Requested amount
        requested: Tokens,
    },

    /// Note missing or shorter than the minimum after trimming
    #[error("A note of at least {min_len} characters is required")]
    NoteRequired {
        /// Minimum trimmed length
        min_len: usize,
    },

    /// Note longer than the maximum after trimming
    #[error("Note exceeds {max_len} characters")]
    NoteTooLong {
        /// Maximum trimmed length
        max_len: usize,
    },
}

impl ValidationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::SenderUnverified => "sender_unverified",
            ValidationError::RecipientUnverified => "recipient_unverified",
            ValidationError::SelfTransferNotAllowed => "self_transfer_not_allowed",
            ValidationError::AmountOutOfRange { .. } => "amount_out_of_range",
            ValidationError::InsufficientBalance { .. } => "insufficient_balance",
            ValidationError::NoteRequired { .. } => "note_required",
            ValidationError::NoteTooLong { .. } => "note_too_long",
        }
    }
}

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Seed data was rejected by validation
    #[error("Seed transfer rejected: {0}")]
    Seed(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_codes() {
        assert_eq!(ValidationError::SenderUnverified.code(), "sender_unverified");
        assert_eq!(
            ValidationError::InsufficientBalance {
                balance: 1,
                requested: 3
            }
            .code(),
            "insufficient_balance"
        );
    }

    #[test]
    fn test_validation_messages() {
        let err = ValidationError::AmountOutOfRange {
            amount: 9,
            min: 1,
            max: 5,
        };
        assert_eq!(err.to_string(), "Amount must be 1-5, got 9");

        let err = ValidationError::NoteRequired { min_len: 3 };
        assert!(err.to_string().contains("at least 3"));
    }

    #[test]
    fn test_seed_error_wraps_validation() {
        let err: Error = ValidationError::SelfTransferNotAllowed.into();
        assert!(matches!(err, Error::Seed(ValidationError::SelfTransferNotAllowed)));
    }
}
