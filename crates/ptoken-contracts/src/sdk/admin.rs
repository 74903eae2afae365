//! Admin-only operations: record updates and fee withdrawal. Authorization is
//! a capability comparison, the signer set must contain the registered admin;
//! the same predicate runs again inside the validator engine.

use ptoken_ledger::{
    Encodable, KeyHash, LedgerClient, LedgerConfig, TxHash, Utxo, Value,
};

use crate::assembler::TxAssembler;
use crate::error::{BuildError, StoreError};
use crate::family::{BlacklistFamily, FeeFamily, FreezableFamily};
use crate::records::{BlacklistDatum, BlacklistRedeemer, FreezeDatum, read_record};

use super::fee_inputs_for;

/// The family's current freeze state.
///
/// # Errors
/// Returns error if no live record exists or its datum is malformed.
pub fn read_frozen(
    client: &impl LedgerClient,
    family: &FreezableFamily,
) -> Result<bool, BuildError> {
    let record = read_record(
        client,
        &family.record.validator.address,
        &family.record.validity.asset,
    )?;
    Ok(record.freeze_state()?.is_frozen)
}

/// The family's current blacklist.
///
/// # Errors
/// Returns error if no live record exists or its datum is malformed.
pub fn read_blacklist(
    client: &impl LedgerClient,
    family: &BlacklistFamily,
) -> Result<BlacklistDatum, BuildError> {
    let record = read_record(
        client,
        &family.record.validator.address,
        &family.record.validity.asset,
    )?;
    Ok(record.blacklist_state()?)
}

/// Replace the freeze record with a new frozen flag. Consumes the live
/// record and produces exactly one successor carrying the same validity
/// marker.
///
/// # Errors
/// Returns `Unauthorized` when the bound wallet is not the admin, and
/// `StaleRead` when a concurrent update won the record.
#[tracing::instrument(level = "info", skip_all, fields(frozen), err)]
pub fn set_frozen(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    family: &FreezableFamily,
    frozen: bool,
) -> Result<TxHash, BuildError> {
    ensure_admin(client, family.admin)?;
    let fee_inputs = fee_inputs_for(client)?;
    let record = read_record(
        client,
        &family.record.validator.address,
        &family.record.validity.asset,
    )?;

    let datum = FreezeDatum { is_frozen: frozen }.encode()?;
    let tx = TxAssembler::new()
        .collect_with_redeemer(&record.utxo, Vec::new())
        .pay_to_contract(
            family.record.validator.address,
            Value::from_asset(family.record.validity.asset.clone(), 1),
            datum,
        )
        .add_signer(family.admin)
        .attach_script(&family.record.validator.script)
        .build();

    let hash = client.submit(tx, &fee_inputs)?;
    client.await_depth(&hash, config.confirmation_depth)?;
    tracing::info!(%hash, frozen, "freeze record replaced");
    Ok(hash)
}

/// Apply a blacklist or whitelist update to the live record.
///
/// # Errors
/// Returns `Unauthorized` when the bound wallet is not the admin, and
/// `StaleRead` when a concurrent update won the record.
#[tracing::instrument(level = "info", skip_all, err)]
pub fn update_blacklist(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    family: &BlacklistFamily,
    redeemer: BlacklistRedeemer,
) -> Result<TxHash, BuildError> {
    ensure_admin(client, family.admin)?;
    let fee_inputs = fee_inputs_for(client)?;
    let record = read_record(
        client,
        &family.record.validator.address,
        &family.record.validity.asset,
    )?;

    let successor = record.blacklist_state()?.apply(&redeemer);
    let tx = TxAssembler::new()
        .collect_with_redeemer(&record.utxo, redeemer.encode()?)
        .pay_to_contract(
            family.record.validator.address,
            Value::from_asset(family.record.validity.asset.clone(), 1),
            successor.encode()?,
        )
        .add_signer(family.admin)
        .attach_script(&family.record.validator.script)
        .build();

    let hash = client.submit(tx, &fee_inputs)?;
    client.await_depth(&hash, config.confirmation_depth)?;
    tracing::info!(%hash, "blacklist record replaced");
    Ok(hash)
}

/// Sweep every accrued fee output from the treasury to the admin's wallet.
/// Returns the total base currency withdrawn.
///
/// # Errors
/// Returns `Unauthorized` when the bound wallet is not the admin, and
/// `NoAccruedFees` when the treasury is empty.
#[tracing::instrument(level = "info", skip_all, err)]
pub fn withdraw_fees(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    family: &FeeFamily,
) -> Result<u64, BuildError> {
    ensure_admin(client, family.admin)?;
    let fee_inputs = fee_inputs_for(client)?;
    let own_address = client.wallet_address()?;

    let treasury_utxos = client.utxos_at(&family.treasury.address)?;
    if treasury_utxos.is_empty() {
        return Err(StoreError::NoAccruedFees.into());
    }
    let total: u64 = treasury_utxos.iter().map(Utxo::lovelace).sum();

    let mut assembler = TxAssembler::new();
    for utxo in &treasury_utxos {
        assembler = assembler.collect_with_redeemer(utxo, Vec::new());
    }
    let tx = assembler
        .pay_to_address(own_address, Value::from_lovelace(total))
        .add_signer(family.admin)
        .attach_script(&family.treasury.script)
        .build();

    let hash = client.submit(tx, &fee_inputs)?;
    client.await_depth(&hash, config.confirmation_depth)?;
    tracing::info!(%hash, total, "treasury swept");
    Ok(total)
}

fn ensure_admin(client: &impl LedgerClient, admin: KeyHash) -> Result<(), BuildError> {
    let own_address = client.wallet_address()?;
    if own_address.key_hash() != Some(&admin) {
        return Err(StoreError::Unauthorized { expected: admin }.into());
    }
    Ok(())
}
