#![allow(dead_code)]

use ptoken_contracts::Blueprint;
use ptoken_emulator::{Account, Emulator};
use ptoken_ledger::{Address, AssetId, LedgerClient, LedgerConfig, LedgerError};

pub const FEE_POOL_LOVELACE: u64 = 20_000_000;

pub struct Harness {
    pub emulator: Emulator,
    pub config: LedgerConfig,
    pub repo: Blueprint,
    pub admin: Account,
}

/// A fresh chain with a funded admin wallet bound.
pub fn harness() -> Harness {
    let config = LedgerConfig::default();
    let mut emulator = Emulator::new(config.clone());
    let admin = Account::from_seed("admin");
    for _ in 0..8 {
        emulator.fund(admin.address, FEE_POOL_LOVELACE);
    }
    emulator.select_wallet(admin);
    Harness {
        emulator,
        config,
        repo: Blueprint::builtin(),
        admin,
    }
}

/// A funded counterparty able to pay its own fees.
pub fn fund_party(emulator: &mut Emulator, seed: &str) -> Account {
    let account = Account::from_seed(seed);
    for _ in 0..4 {
        emulator.fund(account.address, FEE_POOL_LOVELACE);
    }
    account
}

/// Total quantity of `asset` sitting at `address`.
pub fn balance_of(
    emulator: &Emulator,
    address: &Address,
    asset: &AssetId,
) -> Result<u64, LedgerError> {
    Ok(emulator
        .utxos_at(address)?
        .iter()
        .map(|utxo| utxo.asset(asset))
        .sum())
}
