//! End-to-end scenarios for the fee-on-transfer policy variant. The fee
//! schedule is fixed at bootstrap and every covered transfer, including the
//! bootstrap mint itself, pays it.

mod common;

use ptoken_contracts::error::{BuildError, StoreError};
use ptoken_contracts::proof::{CoveredTransfer, find_proof_at};
use ptoken_contracts::{pick_fee_inputs, pick_largest_token_output, proof_templates, sdk};
use ptoken_contracts::build_covered_transfer;
use ptoken_ledger::{LedgerClient, LedgerError, TxOut, Utxo, Value};

const FEE: u64 = 5_000_000;

#[test]
fn every_transfer_accrues_the_fee_and_the_admin_sweeps_it() -> anyhow::Result<()> {
    let mut h = common::harness();
    let family = sdk::bootstrap_fee_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        h.admin.key,
        "FEE",
        FEE,
        &[1_000],
    )?;
    let proofs = proof_templates(&h.repo)?;
    let covers = [family.cover_policy()];
    let alice = common::fund_party(&mut h.emulator, "alice");

    sdk::transfer_covered(
        &mut h.emulator,
        &h.config,
        &proofs,
        &family.token.asset,
        &covers,
        alice.address,
        200,
    )?;

    // One fee from the bootstrap mint, one from the transfer.
    let accrued: u64 = h
        .emulator
        .utxos_at(&family.treasury.address)?
        .iter()
        .map(Utxo::lovelace)
        .sum();
    assert_eq!(accrued, FEE * 2);

    let swept = sdk::withdraw_fees(&mut h.emulator, &h.config, &family)?;
    assert_eq!(swept, FEE * 2);
    assert!(h.emulator.utxos_at(&family.treasury.address)?.is_empty());

    let err = sdk::withdraw_fees(&mut h.emulator, &h.config, &family)
        .expect_err("treasury is empty now");
    assert!(matches!(err, BuildError::Store(StoreError::NoAccruedFees)));
    Ok(())
}

#[test]
fn skipping_the_fee_is_rejected() -> anyhow::Result<()> {
    let mut h = common::harness();
    let family = sdk::bootstrap_fee_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        h.admin.key,
        "FEE",
        FEE,
        &[1_000],
    )?;
    let proofs = proof_templates(&h.repo)?;
    let alice = common::fund_party(&mut h.emulator, "alice");

    let wallet = h.emulator.wallet_utxos()?;
    let token_utxo = pick_largest_token_output(&wallet, &family.token.asset)?;
    let prior = find_proof_at(&h.emulator, &proofs, &token_utxo, &family.check.asset)?;

    // A cover with the fee payment stripped out still mints the check marker,
    // whose predicate demands the treasury output.
    let mut cover = family.cover_policy();
    cover.fee = None;
    let tx = build_covered_transfer(
        &proofs,
        &[cover],
        &CoveredTransfer {
            token_inputs: vec![token_utxo],
            prior_proofs: vec![prior],
            records: Vec::new(),
            outputs: vec![TxOut::new(
                alice.address,
                Value::from_asset(family.token.asset.clone(), 1_000),
            )],
        },
    )?;

    let err = h
        .emulator
        .submit(tx, &pick_fee_inputs(&wallet))
        .expect_err("no fee output");
    assert!(matches!(err, LedgerError::EngineRejected { .. }));
    Ok(())
}

#[test]
fn only_the_admin_withdraws() -> anyhow::Result<()> {
    let mut h = common::harness();
    let family = sdk::bootstrap_fee_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        h.admin.key,
        "FEE",
        FEE,
        &[1_000],
    )?;
    let alice = common::fund_party(&mut h.emulator, "alice");

    h.emulator.select_wallet(alice);
    let err = sdk::withdraw_fees(&mut h.emulator, &h.config, &family)
        .expect_err("alice is not the admin");
    assert!(matches!(
        err,
        BuildError::Store(StoreError::Unauthorized { expected }) if expected == h.admin.key
    ));
    Ok(())
}
