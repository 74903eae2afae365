#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! Transfer-time compliance policies (freeze, blacklist, per-transfer fee) for
//! tokens on a UTXO-style ledger.
//!
//! Shared policy state lives in a single consume-and-replace record output;
//! every compliant transfer co-creates a proof output whose check markers are
//! only mintable while the current record satisfies the policy predicate. The
//! proof is correlated to the token outputs it covers by originating
//! transaction, so it cannot be detached, replayed, or forged.

pub mod assembler;
pub mod deriver;
pub mod error;
pub mod family;
pub mod proof;
pub mod records;
pub mod sdk;
pub mod selection;
pub mod templates;

pub use assembler::TxAssembler;
pub use deriver::{
    Blueprint, MintingPolicyArtifact, ScriptIdentity, TemplateRepository, ValidatorArtifact,
    derive, minting_policy, validator,
};
pub use error::{BuildError, DeriveError, ProofError, SelectionError, StoreError};
pub use family::{
    BlacklistFamily, CoverPolicy, FeeFamily, FeePayment, FreezableFamily, ProofTemplates,
    RecordLocator, RecordScripts, plain_token, proof_templates,
};
pub use proof::{CoveredTransfer, build_covered_transfer, find_proof};
pub use records::{
    BlacklistDatum, BlacklistRedeemer, FreezeDatum, PolicyKind, PolicyRecord, read_record,
};
pub use selection::{pick_fee_inputs, pick_largest_token_output};
