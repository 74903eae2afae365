//! External ledger-client interface.

use crate::error::LedgerError;
use crate::transaction::Transaction;
use crate::types::{Address, TxHash, Utxo};

/// A ledger client bound to one wallet: output enumeration, balancing,
/// signing, submission, and confirmation-depth waiting.
///
/// `submit` receives an unbalanced candidate transaction plus the fee-only
/// outputs the caller is willing to spend for balancing; the client adds
/// whatever inputs and change it needs, signs with the bound wallet, runs
/// the validator engine, and commits atomically. A rejection has no partial
/// effects.
pub trait LedgerClient {
    /// Enumerate live outputs sitting at `address`.
    ///
    /// # Errors
    /// Returns error if the ledger cannot be queried.
    fn utxos_at(&self, address: &Address) -> Result<Vec<Utxo>, LedgerError>;

    /// Enumerate the bound wallet's live outputs.
    ///
    /// # Errors
    /// Returns error if the ledger cannot be queried.
    fn wallet_utxos(&self) -> Result<Vec<Utxo>, LedgerError>;

    /// The bound wallet's receive address.
    ///
    /// # Errors
    /// Returns error if no wallet is bound.
    fn wallet_address(&self) -> Result<Address, LedgerError>;

    /// Balance, sign, validate, and commit `tx`, preferring `fee_inputs`
    /// for balancing.
    ///
    /// # Errors
    /// Returns [`LedgerError::StaleRead`] if a spent or referenced output is
    /// no longer live, [`LedgerError::EngineRejected`] if a validator
    /// predicate fails, and [`LedgerError::BalanceUnsatisfied`] if the
    /// supplied inputs cannot cover outputs plus fees.
    fn submit(&mut self, tx: Transaction, fee_inputs: &[Utxo]) -> Result<TxHash, LedgerError>;

    /// Block until `tx` has reached `depth` confirmations. Required before
    /// reading or referencing outputs the transaction produced.
    ///
    /// # Errors
    /// Returns error if the transaction is unknown to the ledger.
    fn await_depth(&mut self, tx: &TxHash, depth: u32) -> Result<(), LedgerError>;
}
