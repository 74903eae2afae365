use crate::types::OutPoint;

/// Errors from canonical byte encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("Encode failed: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Decode failed: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Decode consumed {consumed} of {total} bytes; trailing bytes remain")]
    TrailingBytes { consumed: usize, total: usize },

    #[error("Hex decode failed: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Errors surfaced by a [`crate::LedgerClient`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// A spent or referenced output is no longer live. The caller should
    /// re-read state and rebuild; a concurrent transaction won the slot.
    #[error("Stale read: output {outpoint} is not live")]
    StaleRead { outpoint: OutPoint },

    /// The validator engine refused the transaction. Never retryable with
    /// the same transaction content.
    #[error("Engine rejected transaction: {reason}")]
    EngineRejected { reason: String },

    #[error("Balancing failed: short {missing_lovelace} lovelace of base currency")]
    BalanceUnsatisfied { missing_lovelace: u64 },

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
