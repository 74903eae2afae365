use ptoken_ledger::{AssetId, EncodingError, KeyHash, LedgerError, OutPoint};

/// Errors from script derivation.
#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    #[error("Unknown template: {template_id}")]
    UnknownTemplate { template_id: String },

    #[error("Blueprint parse failed: {0}")]
    BlueprintParse(#[from] serde_json::Error),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Errors from the policy record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No live record carries the validity marker. Often an expected signal
    /// rather than a bug: the family was never bootstrapped here.
    #[error("No live policy record carries {validity}")]
    NotFound { validity: AssetId },

    /// More than one live record carries the validity marker. A store
    /// invariant is broken; treat as fatal, do not retry.
    #[error("Policy record invariant violated: {count} live records carry {validity}")]
    RecordNotUnique { validity: AssetId, count: usize },

    #[error("Signer is not the policy admin {expected}")]
    Unauthorized { expected: KeyHash },

    #[error("No fees accrued at the treasury")]
    NoAccruedFees,

    #[error("Record datum malformed: {0}")]
    Datum(#[from] EncodingError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Errors from proof correlation.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// The intended failure mode for non-compliant history: either the token
    /// output was produced without minting check markers, or its proof was
    /// consumed without being recreated.
    #[error("No proof covering {token_outpoint} carries marker {check_marker}")]
    NoProofFound {
        token_outpoint: OutPoint,
        check_marker: AssetId,
    },
}

/// Errors from UTXO selection.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("No wallet output holds asset {asset}")]
    InsufficientBalance { asset: AssetId },

    /// The transfer exceeds the single selected output. Merge token outputs
    /// first; inputs are never coalesced implicitly.
    #[error("Requested {requested} exceeds the selected output's balance {available}")]
    AmountTooSmall { requested: u64, available: u64 },

    #[error("Wallet holds no base-currency-only outputs to fund fees")]
    NoFeeInputs,
}

/// Top-level error for transaction-building operations.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The requested supply does not fit a signed mint amount.
    #[error("Requested supply {requested} exceeds the mintable range")]
    SupplyOutOfRange { requested: u64 },

    #[error(transparent)]
    Derive(#[from] DeriveError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl BuildError {
    /// True when the failure came from losing a singleton race and the
    /// operation should be rebuilt from fresh reads.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(
            self,
            Self::Ledger(LedgerError::StaleRead { .. })
                | Self::Store(StoreError::Ledger(LedgerError::StaleRead { .. }))
        )
    }

    /// True when the validator engine refused the transaction. Retrying the
    /// same content is pointless; the predicate itself failed.
    #[must_use]
    pub const fn is_engine_rejection(&self) -> bool {
        matches!(
            self,
            Self::Ledger(LedgerError::EngineRejected { .. })
                | Self::Store(StoreError::Ledger(LedgerError::EngineRejected { .. }))
        )
    }
}
