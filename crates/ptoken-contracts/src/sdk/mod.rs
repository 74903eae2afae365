//! High-level submitted operations: bootstrap, covered transfer, admin
//! updates, and wallet maintenance. Each is a single synchronous pipeline of
//! ledger reads followed by one submission, then a confirmation wait.

mod admin;
mod bootstrap;
mod maintenance;
mod transfer;

pub use admin::{
    read_blacklist, read_frozen, set_frozen, update_blacklist, withdraw_fees,
};
pub use bootstrap::{
    bootstrap_blacklist_record, bootstrap_blacklist_family, bootstrap_fee_family,
    bootstrap_freezable_family, bootstrap_freeze_record, bootstrap_plain_token,
};
pub use maintenance::create_fee_outputs;
pub use transfer::{merge_token_outputs, transfer_covered};

use ptoken_ledger::{LedgerClient, Utxo};

use crate::error::{BuildError, SelectionError};
use crate::selection::pick_fee_inputs;

/// Singleton resources (the policy record, any specific output) are serialized
/// by first-committed-wins at the ledger; a loser must re-read and rebuild.
/// This drives `op` through that client-side loop.
///
/// # Errors
/// Returns the final error once `max_attempts` stale reads have been consumed,
/// or the first non-stale error immediately.
pub fn with_stale_retry<T>(
    max_attempts: u32,
    mut op: impl FnMut() -> Result<T, BuildError>,
) -> Result<T, BuildError> {
    let mut attempt = 0;
    loop {
        match op() {
            Err(err) if err.is_stale() && attempt + 1 < max_attempts => {
                attempt += 1;
                tracing::debug!(attempt, "lost a singleton race, rebuilding from fresh reads");
            }
            other => return other,
        }
    }
}

/// The wallet's fee-only outputs, failing early when there are none.
fn fee_inputs_for(client: &impl LedgerClient) -> Result<Vec<Utxo>, BuildError> {
    let fee_inputs = pick_fee_inputs(&client.wallet_utxos()?);
    if fee_inputs.is_empty() {
        return Err(SelectionError::NoFeeInputs.into());
    }
    Ok(fee_inputs)
}
