//! Wallet maintenance. Covered operations spend fee-only outputs alongside
//! their token inputs, so a wallet that runs many of them in sequence needs a
//! pool of small base-currency outputs to draw from.

use ptoken_ledger::{LedgerClient, LedgerConfig, TxHash, Value};

use crate::assembler::TxAssembler;
use crate::error::BuildError;

use super::fee_inputs_for;

/// Fan the wallet's balance out into `count` outputs of `amount_each` base
/// currency, each usable as an independent fee input.
///
/// # Errors
/// Returns error if the wallet has no fee-only outputs to fund the fan-out,
/// or the ledger cannot cover `count * amount_each`.
#[tracing::instrument(level = "info", skip_all, fields(count, amount_each), err)]
pub fn create_fee_outputs(
    client: &mut impl LedgerClient,
    config: &LedgerConfig,
    count: u32,
    amount_each: u64,
) -> Result<TxHash, BuildError> {
    let fee_inputs = fee_inputs_for(client)?;
    let own_address = client.wallet_address()?;

    let mut assembler = TxAssembler::new();
    for _ in 0..count {
        assembler = assembler.pay_to_address(own_address, Value::from_lovelace(amount_each));
    }

    let hash = client.submit(assembler.build(), &fee_inputs)?;
    client.await_depth(&hash, config.confirmation_depth)?;
    tracing::info!(%hash, count, "fee outputs created");
    Ok(hash)
}
