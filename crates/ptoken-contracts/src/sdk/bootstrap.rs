//! Bootstrap transactions: the one-time record creation and the initial
//! token mint of each policy variant.

use ptoken_ledger::{
    Encodable, KeyHash, LedgerClient, LedgerConfig, TxHash, Utxo, Value,
};

use crate::assembler::TxAssembler;
use crate::deriver::{MintingPolicyArtifact, TemplateRepository};
use crate::error::BuildError;
use crate::family::{
    BlacklistFamily, CoverPolicy, FeeFamily, FreezableFamily, RecordScripts, plain_token,
    proof_templates,
};
use crate::records::{BlacklistDatum, FreezeDatum, read_record};

use super::fee_inputs_for;

/// Create the freeze record: consume a seed, mint the validity marker, and
/// produce the first record with an unfrozen payload.
///
/// # Errors
/// Returns error if the wallet has no fee-only outputs, derivation fails, or
/// the ledger rejects the transaction.
#[tracing::instrument(level = "info", skip_all, err)]
pub fn bootstrap_freeze_record(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    repo: &impl TemplateRepository,
    admin: KeyHash,
) -> Result<RecordScripts, BuildError> {
    let fee_inputs = fee_inputs_for(client)?;
    let seed = fee_inputs[0].clone();
    let record = FreezableFamily::derive_record(repo, admin, seed.outpoint)?;
    let datum = FreezeDatum { is_frozen: false }.encode()?;
    submit_record_tx(client, config, &record, &seed, datum, &fee_inputs)?;
    Ok(record)
}

/// Create the blacklist record with an empty identity list.
///
/// # Errors
/// Returns error if the wallet has no fee-only outputs, derivation fails, or
/// the ledger rejects the transaction.
#[tracing::instrument(level = "info", skip_all, err)]
pub fn bootstrap_blacklist_record(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    repo: &impl TemplateRepository,
    admin: KeyHash,
) -> Result<RecordScripts, BuildError> {
    let fee_inputs = fee_inputs_for(client)?;
    let seed = fee_inputs[0].clone();
    let record = BlacklistFamily::derive_record(repo, admin, seed.outpoint)?;
    let datum = BlacklistDatum::default().encode()?;
    submit_record_tx(client, config, &record, &seed, datum, &fee_inputs)?;
    Ok(record)
}

fn submit_record_tx(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    record: &RecordScripts,
    seed: &Utxo,
    datum: Vec<u8>,
    fee_inputs: &[Utxo],
) -> Result<TxHash, BuildError> {
    let tx = TxAssembler::new()
        .collect(seed)
        .pay_to_contract(
            record.validator.address,
            Value::from_asset(record.validity.asset.clone(), 1),
            datum,
        )
        .mint(record.validity.asset.clone(), 1, None)
        .attach_script(&record.validity.script)
        .build();

    let hash = client.submit(tx, fee_inputs)?;
    client.await_depth(&hash, config.confirmation_depth)?;
    tracing::info!(%hash, "policy record bootstrapped");
    Ok(hash)
}

/// Mint a freezable family's supply, covered by a fresh proof referencing the
/// live freeze record. `distribution` gives the token quantity of each new
/// output; supply is its sum.
///
/// # Errors
/// Returns error if no record is live, derivation fails, or the engine
/// rejects the mint.
#[tracing::instrument(level = "info", skip_all, fields(token_name), err)]
pub fn bootstrap_freezable_family(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    repo: &impl TemplateRepository,
    record: RecordScripts,
    admin: KeyHash,
    token_name: &str,
    distribution: &[u64],
) -> Result<FreezableFamily, BuildError> {
    let fee_inputs = fee_inputs_for(client)?;
    let seed = fee_inputs[0].clone();
    let family = FreezableFamily::derive(repo, record, admin, token_name, seed.outpoint)?;

    let record_utxo = read_record(
        client,
        &family.record.validator.address,
        &family.record.validity.asset,
    )?
    .utxo;

    submit_family_mint(
        client,
        config,
        repo,
        &family.token,
        &[family.cover_policy()],
        &[record_utxo],
        &seed,
        distribution,
        &fee_inputs,
    )?;
    Ok(family)
}

/// Mint a blacklist family's supply, covered against the live blacklist record.
///
/// # Errors
/// Returns error if no record is live, derivation fails, or the engine
/// rejects the mint.
#[tracing::instrument(level = "info", skip_all, fields(token_name), err)]
pub fn bootstrap_blacklist_family(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    repo: &impl TemplateRepository,
    record: RecordScripts,
    admin: KeyHash,
    token_name: &str,
    distribution: &[u64],
) -> Result<BlacklistFamily, BuildError> {
    let fee_inputs = fee_inputs_for(client)?;
    let seed = fee_inputs[0].clone();
    let family = BlacklistFamily::derive(repo, record, admin, token_name, seed.outpoint)?;

    let record_utxo = read_record(
        client,
        &family.record.validator.address,
        &family.record.validity.asset,
    )?
    .utxo;

    submit_family_mint(
        client,
        config,
        repo,
        &family.token,
        &[family.cover_policy()],
        &[record_utxo],
        &seed,
        distribution,
        &fee_inputs,
    )?;
    Ok(family)
}

/// Mint a fee-on-transfer family's supply. No record exists for this variant;
/// the fee schedule is baked into the check policy, and the bootstrap pays the
/// initial fee itself.
///
/// # Errors
/// Returns error if the wallet has no fee-only outputs, derivation fails, or
/// the engine rejects the mint.
#[tracing::instrument(level = "info", skip_all, fields(token_name, fee_amount), err)]
pub fn bootstrap_fee_family(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    repo: &impl TemplateRepository,
    admin: KeyHash,
    token_name: &str,
    fee_amount: u64,
    distribution: &[u64],
) -> Result<FeeFamily, BuildError> {
    let fee_inputs = fee_inputs_for(client)?;
    let seed = fee_inputs[0].clone();
    let family = FeeFamily::derive(repo, admin, token_name, fee_amount, seed.outpoint)?;

    submit_family_mint(
        client,
        config,
        repo,
        &family.token,
        &[family.cover_policy()],
        &[],
        &seed,
        distribution,
        &fee_inputs,
    )?;
    Ok(family)
}

#[allow(clippy::too_many_arguments)]
fn submit_family_mint(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    repo: &impl TemplateRepository,
    token: &MintingPolicyArtifact,
    covers: &[CoverPolicy],
    records: &[Utxo],
    seed: &Utxo,
    distribution: &[u64],
    fee_inputs: &[Utxo],
) -> Result<TxHash, BuildError> {
    let proofs = proof_templates(repo)?;
    let own_address = client.wallet_address()?;
    let supply: u64 = distribution.iter().sum();
    let minted =
        i64::try_from(supply).map_err(|_| BuildError::SupplyOutOfRange { requested: supply })?;

    let mut assembler = TxAssembler::new()
        .collect(seed)
        .mint(token.asset.clone(), minted, None)
        .attach_script(&token.script);

    for record in records {
        assembler = assembler.read_from(record);
    }
    for quantity in distribution {
        assembler =
            assembler.pay_to_address(own_address, Value::from_asset(token.asset.clone(), *quantity));
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
    assembler = assembler.pay_to_address(proofs.validator.address, proof_value);

    let hash = client.submit(assembler.build(), fee_inputs)?;
    client.await_depth(&hash, config.confirmation_depth)?;
    tracing::info!(%hash, supply, "token family supply minted");
    Ok(hash)
}

/// Mint `amount` units of a plain, unrestricted token derived from
/// `word`. Intended for test fixtures and non-programmable assets.
///
/// # Errors
/// Returns error if the wallet has no fee-only outputs or submission fails.
#[tracing::instrument(level = "info", skip_all, fields(word, amount), err)]
pub fn bootstrap_plain_token(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    repo: &impl TemplateRepository,
    word: &str,
    amount: u64,
) -> Result<MintingPolicyArtifact, BuildError> {
    let fee_inputs = fee_inputs_for(client)?;
    let artifact = plain_token(repo, word)?;
    let own_address = client.wallet_address()?;
    let minted =
        i64::try_from(amount).map_err(|_| BuildError::SupplyOutOfRange { requested: amount })?;

    let tx = TxAssembler::new()
        .pay_to_address(own_address, Value::from_asset(artifact.asset.clone(), amount))
        .mint(artifact.asset.clone(), minted, None)
        .attach_script(&artifact.script)
        .build();

    let hash = client.submit(tx, &fee_inputs)?;
    client.await_depth(&hash, config.confirmation_depth)?;
    Ok(artifact)
}
