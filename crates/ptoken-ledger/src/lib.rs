#![warn(clippy::all, clippy::pedantic)]

//! eUTXO ledger data model and external-interface traits for programmable tokens.
//!
//! This crate defines the local view a transaction builder works against: outputs,
//! multi-asset values, parameterized scripts, and the unsigned transaction shape.
//! Execution of validator predicates and submission are behind [`LedgerClient`].

mod client;
mod config;
mod encoding;
mod error;
mod script;
mod transaction;
mod types;

pub use client::LedgerClient;
pub use config::{ConfigError, LedgerConfig};
pub use encoding::{Decode, Encodable, Encode};
pub use error::{EncodingError, LedgerError};
pub use script::{Script, ScriptCode, ScriptParam};
pub use transaction::{MintIntent, Transaction, TxIn};
pub use types::{
    Address, AssetId, AssetName, Credential, KeyHash, OutPoint, PolicyId, ScriptHash, TxHash,
    TxOut, Utxo, Value,
};
