#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! An in-process eUTXO ledger for tests and local development.
//!
//! The emulator keeps a UTXO set and a script store, balances and "signs"
//! candidate transactions against one bound wallet, and runs the same policy
//! predicates a production validator engine would: one-shot mints, record
//! singleton replacement, check-marker minting gated on the referenced policy
//! record, and proof-correlation covering of every spent token output. Each
//! committed transaction is its own block.

mod chain;
mod engine;
mod wallet;

pub use chain::Emulator;
pub use wallet::Account;
