//! Unsigned transaction shape and its canonical hash.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::encoding::Encodable;
use crate::error::EncodingError;
use crate::script::Script;
use crate::types::{AssetId, KeyHash, OutPoint, TxHash, TxOut};

/// A spent input with an optional redeemer for script-owned outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TxIn {
    pub outpoint: OutPoint,
    pub redeemer: Option<Vec<u8>>,
}

impl TxIn {
    #[must_use]
    pub const fn new(outpoint: OutPoint) -> Self {
        Self {
            outpoint,
            redeemer: None,
        }
    }

    #[must_use]
    pub const fn with_redeemer(outpoint: OutPoint, redeemer: Vec<u8>) -> Self {
        Self {
            outpoint,
            redeemer: Some(redeemer),
        }
    }
}

/// A minting instruction: positive amounts mint, negative amounts burn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct MintIntent {
    pub asset: AssetId,
    pub amount: i64,
    pub redeemer: Option<Vec<u8>>,
}

/// A candidate transaction as handed to the ledger client for balancing,
/// signing, validation, and submission.
///
/// Reference inputs are read-only: the transaction observes their current
/// content without consuming them.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    pub inputs: Vec<TxIn>,
    pub reference_inputs: Vec<OutPoint>,
    pub outputs: Vec<TxOut>,
    pub mints: Vec<MintIntent>,
    pub scripts: Vec<Script>,
    pub required_signers: Vec<KeyHash>,
}

impl Encodable for Transaction {}

impl Transaction {
    /// Canonical transaction hash over the encoded transaction body.
    ///
    /// # Errors
    /// Returns error if the transaction fails to encode.
    pub fn hash(&self) -> Result<TxHash, EncodingError> {
        let digest = Sha256::digest(Encodable::encode(self)?);
        Ok(TxHash::new(digest.into()))
    }

    /// Total quantity of `asset` minted (net of burns) by this transaction.
    #[must_use]
    pub fn minted(&self, asset: &AssetId) -> i64 {
        self.mints
            .iter()
            .filter(|mint| &mint.asset == asset)
            .map(|mint| mint.amount)
            .sum()
    }
}
