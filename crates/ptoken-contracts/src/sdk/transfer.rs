//! Covered transfers and explicit token-output merging.

use ptoken_ledger::{
    Address, AssetId, LedgerClient, LedgerConfig, TxHash, TxOut, Utxo, Value,
};

use crate::error::{BuildError, SelectionError};
use crate::family::{CoverPolicy, ProofTemplates};
use crate::proof::{CoveredTransfer, build_covered_transfer, find_proof_at};
use crate::records::read_record;
use crate::selection::{ensure_transferable, pick_largest_token_output};

use super::fee_inputs_for;

/// Transfer `amount` of `token` to `recipient`, observing every policy in
/// `covers`: reference the current records, reference the prior proof of the
/// spent output, mint fresh check markers into one new proof output, and pay
/// any mandatory fee.
///
/// Selection takes the wallet's largest holding of `token` and never
/// coalesces inputs; use [`merge_token_outputs`] first when one output is too
/// small. Compliance itself is decided by the validator engine at submission.
///
/// # Errors
/// Returns selection errors locally; `EngineRejected` surfaces unchanged
/// when a policy predicate refuses the transfer.
#[tracing::instrument(level = "info", skip_all, fields(amount), err)]
pub fn transfer_covered(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    proofs: &ProofTemplates,
    token: &AssetId,
    covers: &[CoverPolicy],
    recipient: Address,
    amount: u64,
) -> Result<TxHash, BuildError> {
    let fee_inputs = fee_inputs_for(client)?;
    let wallet = client.wallet_utxos()?;
    let own_address = client.wallet_address()?;

    let token_utxo = pick_largest_token_output(&wallet, token)?;
    ensure_transferable(&token_utxo, token, amount)?;

    let records = read_cover_records(client, covers)?;
    let prior_proofs = collect_prior_proofs(client, proofs, covers, &[token_utxo.clone()])?;

    let mut outputs = vec![TxOut::new(
        recipient,
        Value::from_asset(token.clone(), amount),
    )];
    let change = change_value(&token_utxo, token, amount);
    if !change.is_lovelace_only() {
        outputs.push(TxOut::new(own_address, change));
    }

    let tx = build_covered_transfer(
        proofs,
        covers,
        &CoveredTransfer {
            token_inputs: vec![token_utxo],
            prior_proofs,
            records,
            outputs,
        },
    )?;

    let hash = client.submit(tx, &fee_inputs)?;
    client.await_depth(&hash, config.confirmation_depth)?;
    tracing::info!(%hash, "covered transfer committed");
    Ok(hash)
}

/// Merge every wallet output holding `token` into a single covered output.
///
/// Each merged input needs its own correlated prior proof; the merge mints
/// one fresh proof output covering the single merged result.
///
/// # Errors
/// Returns `InsufficientBalance` when the wallet holds no such output.
#[tracing::instrument(level = "info", skip_all, err)]
pub fn merge_token_outputs(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    proofs: &ProofTemplates,
    token: &AssetId,
    covers: &[CoverPolicy],
) -> Result<TxHash, BuildError> {
    let fee_inputs = fee_inputs_for(client)?;
    let wallet = client.wallet_utxos()?;
    let own_address = client.wallet_address()?;

    let token_inputs: Vec<Utxo> = wallet
        .iter()
        .filter(|utxo| utxo.asset(token) > 0)
        .cloned()
        .collect();
    if token_inputs.is_empty() {
        return Err(SelectionError::InsufficientBalance {
            asset: token.clone(),
        }
        .into());
    }

    let records = read_cover_records(client, covers)?;
    let prior_proofs = collect_prior_proofs(client, proofs, covers, &token_inputs)?;

    let mut merged = Value::default();
    for input in &token_inputs {
        for (asset, quantity) in input.output.value.assets() {
            let total = merged.asset(asset).saturating_add(quantity);
            merged.set_asset(asset.clone(), total);
        }
    }

    let tx = build_covered_transfer(
        proofs,
        covers,
        &CoveredTransfer {
            token_inputs,
            prior_proofs,
            records,
            outputs: vec![TxOut::new(own_address, merged)],
        },
    )?;

    let hash = client.submit(tx, &fee_inputs)?;
    client.await_depth(&hash, config.confirmation_depth)?;
    tracing::info!(%hash, "token outputs merged");
    Ok(hash)
}

fn read_cover_records(
    client: &impl LedgerClient,
    covers: &[CoverPolicy],
) -> Result<Vec<Utxo>, BuildError> {
    let mut records = Vec::new();
    for cover in covers {
        if let Some(locator) = &cover.record {
            records.push(read_record(client, &locator.address, &locator.validity)?.utxo);
        }
    }
    Ok(records)
}

/// One correlated proof per spent token input and check marker, deduplicated
/// by position: a single proof output usually covers all markers at once.
fn collect_prior_proofs(
    client: &impl LedgerClient,
    proofs: &ProofTemplates,
    covers: &[CoverPolicy],
    token_inputs: &[Utxo],
) -> Result<Vec<Utxo>, BuildError> {
    let mut found: Vec<Utxo> = Vec::new();
    for input in token_inputs {
        for cover in covers {
            let proof = find_proof_at(client, proofs, input, &cover.check.asset)?;
            if !found.iter().any(|existing| existing.outpoint == proof.outpoint) {
                found.push(proof);
            }
        }
    }
    Ok(found)
}

/// Whatever the spent token output holds beyond the transferred amount; the
/// same transaction's fresh proof covers it alongside the recipient output.
fn change_value(token_utxo: &Utxo, token: &AssetId, amount: u64) -> Value {
    let mut change = Value::default();
    for (asset, quantity) in token_utxo.output.value.assets() {
        let remaining = if asset == token {
            quantity - amount
        } else {
            quantity
        };
        change.set_asset(asset.clone(), remaining);
    }
    change
}
