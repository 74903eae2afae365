//! End-to-end scenarios for the freezable policy variant.

mod common;

use ptoken_contracts::error::{BuildError, SelectionError};
use ptoken_contracts::proof::find_proof_at;
use ptoken_contracts::{
    TxAssembler, pick_fee_inputs, pick_largest_token_output, proof_templates, read_record, sdk,
};
use ptoken_ledger::{LedgerClient, LedgerError, Value};

#[test]
fn bootstrap_then_transfer_moves_tokens() -> anyhow::Result<()> {
    let mut h = common::harness();
    let record = sdk::bootstrap_freeze_record(&mut h.emulator, &h.config, &h.repo, h.admin.key)?;
    let family = sdk::bootstrap_freezable_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        record,
        h.admin.key,
        "FRZ",
        &[1_000],
    )?;
    assert!(!sdk::read_frozen(&h.emulator, &family)?);

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
        250,
    )?;

    assert_eq!(
        common::balance_of(&h.emulator, &alice.address, &family.token.asset)?,
        250
    );
    assert_eq!(
        common::balance_of(&h.emulator, &h.admin.address, &family.token.asset)?,
        750
    );
    Ok(())
}

#[test]
fn freezing_blocks_transfers_and_unfreezing_restores() -> anyhow::Result<()> {
    let mut h = common::harness();
    let record = sdk::bootstrap_freeze_record(&mut h.emulator, &h.config, &h.repo, h.admin.key)?;
    let family = sdk::bootstrap_freezable_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        record,
        h.admin.key,
        "FRZ",
        &[1_000],
    )?;
    let proofs = proof_templates(&h.repo)?;
    let covers = [family.cover_policy()];
    let alice = common::fund_party(&mut h.emulator, "alice");

    sdk::set_frozen(&mut h.emulator, &h.config, &family, true)?;
    assert!(sdk::read_frozen(&h.emulator, &family)?);

    let err = sdk::transfer_covered(
        &mut h.emulator,
        &h.config,
        &proofs,
        &family.token.asset,
        &covers,
        alice.address,
        100,
    )
    .expect_err("family is frozen");
    assert!(err.is_engine_rejection());

    sdk::set_frozen(&mut h.emulator, &h.config, &family, false)?;
    sdk::transfer_covered(
        &mut h.emulator,
        &h.config,
        &proofs,
        &family.token.asset,
        &covers,
        alice.address,
        100,
    )?;
    assert_eq!(
        common::balance_of(&h.emulator, &alice.address, &family.token.asset)?,
        100
    );
    Ok(())
}

#[test]
fn a_pre_freeze_proof_does_not_bypass_the_freeze() -> anyhow::Result<()> {
    let mut h = common::harness();
    let record = sdk::bootstrap_freeze_record(&mut h.emulator, &h.config, &h.repo, h.admin.key)?;
    let family = sdk::bootstrap_freezable_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        record,
        h.admin.key,
        "FRZ",
        &[1_000],
    )?;
    let proofs = proof_templates(&h.repo)?;
    let alice = common::fund_party(&mut h.emulator, "alice");

    sdk::set_frozen(&mut h.emulator, &h.config, &family, true)?;

    // The bootstrap proof predates the freeze. Referencing it alone, without
    // minting fresh check markers, must not move the tokens.
    let wallet = h.emulator.wallet_utxos()?;
    let token_utxo = pick_largest_token_output(&wallet, &family.token.asset)?;
    let prior = find_proof_at(&h.emulator, &proofs, &token_utxo, &family.check.asset)?;

    let tx = TxAssembler::new()
        .collect(&token_utxo)
        .read_from(&prior)
        .pay_to_address(
            alice.address,
            Value::from_asset(family.token.asset.clone(), 1_000),
        )
        .build();
    let err = h
        .emulator
        .submit(tx, &pick_fee_inputs(&wallet))
        .expect_err("family is frozen");
    assert!(matches!(err, LedgerError::EngineRejected { .. }));
    assert_eq!(
        common::balance_of(&h.emulator, &alice.address, &family.token.asset)?,
        0
    );
    Ok(())
}

#[test]
fn received_tokens_are_covered_for_onward_transfer() -> anyhow::Result<()> {
    let mut h = common::harness();
    let record = sdk::bootstrap_freeze_record(&mut h.emulator, &h.config, &h.repo, h.admin.key)?;
    let family = sdk::bootstrap_freezable_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        record,
        h.admin.key,
        "FRZ",
        &[1_000],
    )?;
    let proofs = proof_templates(&h.repo)?;
    let covers = [family.cover_policy()];
    let alice = common::fund_party(&mut h.emulator, "alice");
    let bob = common::fund_party(&mut h.emulator, "bob");

    sdk::transfer_covered(
        &mut h.emulator,
        &h.config,
        &proofs,
        &family.token.asset,
        &covers,
        alice.address,
        400,
    )?;

    h.emulator.select_wallet(alice);
    sdk::transfer_covered(
        &mut h.emulator,
        &h.config,
        &proofs,
        &family.token.asset,
        &covers,
        bob.address,
        150,
    )?;

    assert_eq!(
        common::balance_of(&h.emulator, &bob.address, &family.token.asset)?,
        150
    );
    assert_eq!(
        common::balance_of(&h.emulator, &alice.address, &family.token.asset)?,
        250
    );
    Ok(())
}

#[test]
fn families_with_distinct_records_are_independent() -> anyhow::Result<()> {
    let mut h = common::harness();
    let record_a = sdk::bootstrap_freeze_record(&mut h.emulator, &h.config, &h.repo, h.admin.key)?;
    let family_a = sdk::bootstrap_freezable_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        record_a,
        h.admin.key,
        "AAA",
        &[500],
    )?;
    let record_b = sdk::bootstrap_freeze_record(&mut h.emulator, &h.config, &h.repo, h.admin.key)?;
    let family_b = sdk::bootstrap_freezable_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        record_b,
        h.admin.key,
        "BBB",
        &[500],
    )?;

    let proofs = proof_templates(&h.repo)?;
    let alice = common::fund_party(&mut h.emulator, "alice");
    sdk::set_frozen(&mut h.emulator, &h.config, &family_a, true)?;

    let err = sdk::transfer_covered(
        &mut h.emulator,
        &h.config,
        &proofs,
        &family_a.token.asset,
        &[family_a.cover_policy()],
        alice.address,
        50,
    )
    .expect_err("family A is frozen");
    assert!(err.is_engine_rejection());

    sdk::transfer_covered(
        &mut h.emulator,
        &h.config,
        &proofs,
        &family_b.token.asset,
        &[family_b.cover_policy()],
        alice.address,
        50,
    )?;
    assert_eq!(
        common::balance_of(&h.emulator, &alice.address, &family_b.token.asset)?,
        50
    );
    Ok(())
}

#[test]
fn merging_coalesces_distributed_outputs() -> anyhow::Result<()> {
    let mut h = common::harness();
    let record = sdk::bootstrap_freeze_record(&mut h.emulator, &h.config, &h.repo, h.admin.key)?;
    let family = sdk::bootstrap_freezable_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        record,
        h.admin.key,
        "FRZ",
        &[400, 300, 300],
    )?;
    let proofs = proof_templates(&h.repo)?;
    let covers = [family.cover_policy()];
    let alice = common::fund_party(&mut h.emulator, "alice");

    // 500 exceeds the largest single output; inputs are never coalesced
    // implicitly.
    let err = sdk::transfer_covered(
        &mut h.emulator,
        &h.config,
        &proofs,
        &family.token.asset,
        &covers,
        alice.address,
        500,
    )
    .expect_err("no single output holds 500");
    assert!(matches!(
        err,
        BuildError::Selection(SelectionError::AmountTooSmall {
            requested: 500,
            available: 400
        })
    ));

    sdk::merge_token_outputs(
        &mut h.emulator,
        &h.config,
        &proofs,
        &family.token.asset,
        &covers,
    )?;
    sdk::transfer_covered(
        &mut h.emulator,
        &h.config,
        &proofs,
        &family.token.asset,
        &covers,
        alice.address,
        500,
    )?;
    assert_eq!(
        common::balance_of(&h.emulator, &alice.address, &family.token.asset)?,
        500
    );
    Ok(())
}

#[test]
fn record_stays_a_singleton_across_updates() -> anyhow::Result<()> {
    let mut h = common::harness();
    let record = sdk::bootstrap_freeze_record(&mut h.emulator, &h.config, &h.repo, h.admin.key)?;
    let family = sdk::bootstrap_freezable_family(
        &mut h.emulator,
        &h.config,
        &h.repo,
        record,
        h.admin.key,
        "FRZ",
        &[1_000],
    )?;

    sdk::set_frozen(&mut h.emulator, &h.config, &family, true)?;
    sdk::set_frozen(&mut h.emulator, &h.config, &family, false)?;

    let live = h
        .emulator
        .utxos_at(&family.record.validator.address)?
        .iter()
        .filter(|utxo| utxo.asset(&family.record.validity.asset) > 0)
        .count();
    assert_eq!(live, 1);
    read_record(
        &h.emulator,
        &family.record.validator.address,
        &family.record.validity.asset,
    )?;
    Ok(())
}
