//! The emulated chain: UTXO set, script store, balancing, and atomic commit.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use ptoken_ledger::{
    Address, LedgerClient, LedgerConfig, LedgerError, OutPoint, ScriptCode, ScriptHash,
    Transaction, TxHash, TxIn, TxOut, Utxo, Value,
};

use crate::engine;
use crate::wallet::Account;

/// An in-process ledger bound to at most one wallet at a time.
///
/// Submission is atomic: balancing, signing, and validation either all
/// succeed and the UTXO set moves to the next block, or nothing changes.
pub struct Emulator {
    config: LedgerConfig,
    utxos: BTreeMap<OutPoint, TxOut>,
    scripts: BTreeMap<ScriptHash, ScriptCode>,
    committed: BTreeMap<TxHash, u64>,
    height: u64,
    wallet: Option<Account>,
    genesis_counter: u64,
}

impl Emulator {
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            utxos: BTreeMap::new(),
            scripts: BTreeMap::new(),
            committed: BTreeMap::new(),
            height: 0,
            wallet: None,
            genesis_counter: 0,
        }
    }

    /// Bind subsequent reads, balancing, and signing to `account`.
    pub fn select_wallet(&mut self, account: Account) {
        self.wallet = Some(account);
    }

    /// Credit `lovelace` of base currency to `address` out of thin air.
    /// Genesis-only; committed transactions must balance.
    pub fn fund(&mut self, address: Address, lovelace: u64) -> Utxo {
        let mut hasher = Sha256::new();
        hasher.update(b"genesis");
        hasher.update(self.genesis_counter.to_be_bytes());
        self.genesis_counter += 1;

        let outpoint = OutPoint::new(TxHash::new(hasher.finalize().into()), 0);
        let output = TxOut::new(address, Value::from_lovelace(lovelace));
        self.utxos.insert(outpoint, output.clone());
        Utxo::new(outpoint, output)
    }

    /// Current block height. Advances by one per committed transaction and
    /// by explicit confirmation waits.
    #[must_use]
    pub const fn height(&self) -> u64 {
        self.height
    }

    fn bound_wallet(&self) -> Result<Account, LedgerError> {
        self.wallet.ok_or_else(|| LedgerError::NotFound {
            what: "bound wallet".to_string(),
        })
    }

    fn resolve(&self, outpoint: OutPoint) -> Result<Utxo, LedgerError> {
        self.utxos
            .get(&outpoint)
            .map(|output| Utxo::new(outpoint, output.clone()))
            .ok_or(LedgerError::StaleRead { outpoint })
    }

    /// Fee candidates beyond the caller's preference: the wallet's live
    /// base-currency-only outputs without datums.
    fn wallet_fee_candidates(&self, address: Address) -> Vec<Utxo> {
        self.utxos
            .iter()
            .filter(|(_, output)| {
                output.address == address
                    && output.value.is_lovelace_only()
                    && output.datum.is_none()
            })
            .map(|(outpoint, output)| Utxo::new(*outpoint, output.clone()))
            .collect()
    }
}

impl LedgerClient for Emulator {
    fn utxos_at(&self, address: &Address) -> Result<Vec<Utxo>, LedgerError> {
        Ok(self
            .utxos
            .iter()
            .filter(|(_, output)| output.address == *address)
            .map(|(outpoint, output)| Utxo::new(*outpoint, output.clone()))
            .collect())
    }

    fn wallet_utxos(&self) -> Result<Vec<Utxo>, LedgerError> {
        self.utxos_at(&self.bound_wallet()?.address)
    }

    fn wallet_address(&self) -> Result<Address, LedgerError> {
        Ok(self.bound_wallet()?.address)
    }

    fn submit(&mut self, tx: Transaction, fee_inputs: &[Utxo]) -> Result<TxHash, LedgerError> {
        let wallet = self.bound_wallet()?;

        let mut inputs = tx.inputs.clone();
        let mut resolved = Vec::with_capacity(inputs.len());
        for input in &inputs {
            resolved.push(self.resolve(input.outpoint)?);
        }
        let mut references = Vec::with_capacity(tx.reference_inputs.len());
        for outpoint in &tx.reference_inputs {
            references.push(self.resolve(*outpoint)?);
        }

        // Top every declared output up to the protocol minimum before
        // working out what balancing still owes.
        let mut outputs = tx.outputs.clone();
        for output in &mut outputs {
            if output.value.lovelace < self.config.min_output_lovelace {
                output.value.lovelace = self.config.min_output_lovelace;
            }
        }

        let produced: u64 = outputs.iter().map(|output| output.value.lovelace).sum();
        let needed = produced + self.config.flat_fee_lovelace;
        let mut available: u64 = resolved.iter().map(Utxo::lovelace).sum();

        let mut candidates = fee_inputs.to_vec();
        candidates.extend(self.wallet_fee_candidates(wallet.address));
        for candidate in candidates {
            if available >= needed {
                break;
            }
            if inputs.iter().any(|input| input.outpoint == candidate.outpoint) {
                continue;
            }
            let Some(output) = self.utxos.get(&candidate.outpoint) else {
                continue;
            };
            if !(output.address == wallet.address
                && output.value.is_lovelace_only()
                && output.datum.is_none())
            {
                continue;
            }
            available += output.value.lovelace;
            inputs.push(TxIn::new(candidate.outpoint));
            resolved.push(Utxo::new(candidate.outpoint, output.clone()));
        }
        if available < needed {
            return Err(LedgerError::BalanceUnsatisfied {
                missing_lovelace: needed - available,
            });
        }

        // Surplus below the output minimum is absorbed into the fee.
        let surplus = available - needed;
        if surplus >= self.config.min_output_lovelace {
            outputs.push(TxOut::new(wallet.address, Value::from_lovelace(surplus)));
        }

        let balanced = Transaction {
            inputs,
            reference_inputs: tx.reference_inputs,
            outputs,
            mints: tx.mints,
            scripts: tx.scripts,
            required_signers: tx.required_signers,
        };
        let hash = balanced.hash()?;

        let mut scripts = self.scripts.clone();
        for script in &balanced.scripts {
            scripts.insert(script.hash(), script.decode_code()?);
        }
        let signers = [wallet.key];
        engine::validate(
            &engine::TxView {
                tx: &balanced,
                inputs: &resolved,
                references: &references,
                signers: &signers,
            },
            &scripts,
        )?;

        let mut created = Vec::with_capacity(balanced.outputs.len());
        for (index, output) in balanced.outputs.iter().enumerate() {
            let index = u32::try_from(index).map_err(|_| LedgerError::EngineRejected {
                reason: "too many outputs".to_string(),
            })?;
            created.push((OutPoint::new(hash, index), output.clone()));
        }

        for input in &balanced.inputs {
            self.utxos.remove(&input.outpoint);
        }
        for (outpoint, output) in created {
            self.utxos.insert(outpoint, output);
        }
        self.scripts = scripts;
        self.height += 1;
        self.committed.insert(hash, self.height);
        tracing::debug!(%hash, height = self.height, "transaction committed");
        Ok(hash)
    }

    fn await_depth(&mut self, tx: &TxHash, depth: u32) -> Result<(), LedgerError> {
        let committed_at = self
            .committed
            .get(tx)
            .copied()
            .ok_or_else(|| LedgerError::NotFound {
                what: format!("transaction {tx}"),
            })?;
        let target = committed_at + u64::from(depth);
        if self.height < target {
            self.height = target;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emulator_with(account: Account, lovelace: u64) -> Emulator {
        let mut emulator = Emulator::new(LedgerConfig::default());
        emulator.fund(account.address, lovelace);
        emulator.select_wallet(account);
        emulator
    }

    fn payment(to: Address, lovelace: u64) -> Transaction {
        Transaction {
            outputs: vec![TxOut::new(to, Value::from_lovelace(lovelace))],
            ..Transaction::default()
        }
    }

    #[test]
    fn pays_and_returns_change_to_the_wallet() -> anyhow::Result<()> {
        let alice = Account::from_seed("alice");
        let bob = Account::from_seed("bob");
        let mut emulator = emulator_with(alice, 100_000_000);

        let fee_inputs = emulator.wallet_utxos()?;
        let hash = emulator.submit(payment(bob.address, 10_000_000), &fee_inputs)?;
        emulator.await_depth(&hash, 1)?;

        let received: u64 = emulator.utxos_at(&bob.address)?.iter().map(Utxo::lovelace).sum();
        assert_eq!(received, 10_000_000);

        let remaining: u64 = emulator.wallet_utxos()?.iter().map(Utxo::lovelace).sum();
        assert_eq!(
            remaining,
            100_000_000 - 10_000_000 - LedgerConfig::default().flat_fee_lovelace
        );
        Ok(())
    }

    #[test]
    fn double_spend_is_a_stale_read() -> anyhow::Result<()> {
        let alice = Account::from_seed("alice");
        let bob = Account::from_seed("bob");
        let mut emulator = emulator_with(alice, 100_000_000);

        let spent = emulator.wallet_utxos()?;
        emulator.submit(payment(bob.address, 10_000_000), &spent)?;

        let mut replay = payment(bob.address, 10_000_000);
        replay.inputs.push(TxIn::new(spent[0].outpoint));
        let err = emulator.submit(replay, &[]).expect_err("already spent");
        assert!(matches!(err, LedgerError::StaleRead { .. }));
        Ok(())
    }

    #[test]
    fn underfunded_wallet_cannot_balance() {
        let alice = Account::from_seed("alice");
        let bob = Account::from_seed("bob");
        let mut emulator = emulator_with(alice, 3_000_000);

        let fee_inputs = emulator.wallet_utxos().expect("wallet bound");
        let err = emulator
            .submit(payment(bob.address, 10_000_000), &fee_inputs)
            .expect_err("cannot cover");
        assert!(matches!(err, LedgerError::BalanceUnsatisfied { .. }));
    }

    #[test]
    fn foreign_outputs_are_never_pulled_in_for_fees() {
        let alice = Account::from_seed("alice");
        let bob = Account::from_seed("bob");
        let mut emulator = Emulator::new(LedgerConfig::default());
        let bobs = emulator.fund(bob.address, 100_000_000);
        emulator.fund(alice.address, 2_500_000);
        emulator.select_wallet(alice);

        let err = emulator
            .submit(payment(bob.address, 10_000_000), &[bobs])
            .expect_err("bob's output is not alice's to spend");
        assert!(matches!(err, LedgerError::BalanceUnsatisfied { .. }));
    }

    #[test]
    fn awaiting_an_unknown_transaction_fails() {
        let mut emulator = Emulator::new(LedgerConfig::default());
        let err = emulator
            .await_depth(&TxHash::new([7; 32]), 1)
            .expect_err("never committed");
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[test]
    fn confirmation_wait_advances_the_height() -> anyhow::Result<()> {
        let alice = Account::from_seed("alice");
        let mut emulator = emulator_with(alice, 100_000_000);

        let fee_inputs = emulator.wallet_utxos()?;
        let hash = emulator.submit(payment(alice.address, 5_000_000), &fee_inputs)?;
        let at_commit = emulator.height();
        emulator.await_depth(&hash, 3)?;
        assert_eq!(emulator.height(), at_commit + 3);
        Ok(())
    }
}
