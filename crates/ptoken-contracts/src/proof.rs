//! The proof-correlation engine.
//!
//! A proof output covers a token-holding output iff both were created by the
//! same transaction and the proof still sits, unspent, at the proof validator
//! with a positive check-marker balance. Correlation is per transaction, not
//! transitive: spending a covered output into new token outputs must co-create
//! a fresh proof, or the new outputs are born uncoverable.
//!
//! Per token-holding output the transitions are binary: spend with a fresh
//! proof and the new outputs are covered; spend without one and the validator
//! engine rejects. There is no stale-but-valid state.

use ptoken_ledger::{AssetId, LedgerClient, Transaction, TxOut, Utxo, Value};

use crate::assembler::TxAssembler;
use crate::error::{BuildError, ProofError};
use crate::family::{CoverPolicy, ProofTemplates};

/// Locate a proof covering `token_utxo` among `proofs` (the outputs sitting
/// at the proof validator address).
///
/// Any match is equally valid cover; callers must not rely on which one is
/// returned.
///
/// # Errors
/// Returns [`ProofError::NoProofFound`] when nothing correlates. That is the
/// intended outcome for outputs produced outside the protocol, or whose proof
/// was consumed without recreation.
pub fn find_proof<'a>(
    proofs: &'a [Utxo],
    token_utxo: &Utxo,
    check_marker: &AssetId,
) -> Result<&'a Utxo, ProofError> {
    proofs
        .iter()
        .find(|proof| proof.origin() == token_utxo.origin() && proof.asset(check_marker) > 0)
        .ok_or_else(|| ProofError::NoProofFound {
            token_outpoint: token_utxo.outpoint,
            check_marker: check_marker.clone(),
        })
}

/// [`find_proof`] against the live ledger.
///
/// # Errors
/// Returns error if the ledger cannot be queried or no proof correlates.
pub fn find_proof_at(
    client: &impl LedgerClient,
    proofs: &ProofTemplates,
    token_utxo: &Utxo,
    check_marker: &AssetId,
) -> Result<Utxo, BuildError> {
    let candidates = client.utxos_at(&proofs.validator.address)?;
    Ok(find_proof(&candidates, token_utxo, check_marker)?.clone())
}

/// Everything a covered transfer is assembled from.
///
/// `token_inputs` are the spent token-holding outputs; `prior_proofs` their
/// correlated covers (one per distinct originating transaction, referenced
/// read-only); `records` the current policy records for every cover that
/// keeps one; `outputs` the new token-holding outputs.
#[derive(Debug, Clone)]
pub struct CoveredTransfer {
    pub token_inputs: Vec<Utxo>,
    pub prior_proofs: Vec<Utxo>,
    pub records: Vec<Utxo>,
    pub outputs: Vec<TxOut>,
}

/// Assemble a transfer that co-creates one fresh proof output.
///
/// The transaction mints one proof-validity marker plus exactly one unit of
/// each cover's check marker, bundles them all into a single output at the
/// proof validator, and adds any mandatory fee outputs. Whether the policy
/// predicates actually hold is decided by the validator engine at submission;
/// no off-chain check substitutes for it.
///
/// # Errors
/// Returns error if redeemer encoding fails.
pub fn build_covered_transfer(
    proofs: &ProofTemplates,
    covers: &[CoverPolicy],
    transfer: &CoveredTransfer,
) -> Result<Transaction, BuildError> {
    let mut assembler = TxAssembler::new();

    for input in &transfer.token_inputs {
        assembler = assembler.collect(input);
    }
    for record in &transfer.records {
        assembler = assembler.read_from(record);
    }
    for prior in &transfer.prior_proofs {
        assembler = assembler.read_from(prior);
    }
    for output in &transfer.outputs {
        assembler = match &output.datum {
            Some(datum) => {
                assembler.pay_to_contract(output.address, output.value.clone(), datum.clone())
            }
            None => assembler.pay_to_address(output.address, output.value.clone()),
        };
    }

    let mut proof_value = Value::from_asset(proofs.marker.asset.clone(), 1);
    assembler = assembler
        .mint(proofs.marker.asset.clone(), 1, None)
        .attach_script(&proofs.marker.script);

    for cover in covers {
        proof_value.set_asset(cover.check.asset.clone(), 1);
        assembler = assembler
            .mint(cover.check.asset.clone(), 1, None)
            .attach_script(&cover.check.script);

        if let Some(fee) = &cover.fee {
            assembler =
                assembler.pay_to_address(fee.destination, Value::from_lovelace(fee.amount));
        }
    }

    // The fresh proof: same transaction as the new token outputs, by construction.
    assembler = assembler.pay_to_address(proofs.validator.address, proof_value);

    Ok(assembler.build())
}
