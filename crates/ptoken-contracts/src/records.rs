//! The policy record store: one live record per token family, located by its
//! validity marker and replaced atomically on every admin update.

use std::fmt;

use serde::{Deserialize, Serialize};

use ptoken_ledger::{Address, AssetId, Encodable, KeyHash, LedgerClient, Utxo};

use crate::error::StoreError;

/// The policy variants a token family can be bootstrapped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Freeze,
    Blacklist,
    FeeOnTransfer,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Freeze => f.write_str("freeze"),
            Self::Blacklist => f.write_str("blacklist"),
            Self::FeeOnTransfer => f.write_str("fee-on-transfer"),
        }
    }
}

/// Freeze-record payload. Encoding is normative: a single boolean byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct FreezeDatum {
    pub is_frozen: bool,
}

impl Encodable for FreezeDatum {}

/// Blacklist-record payload: the ordered list of blacklisted identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct BlacklistDatum {
    pub blacklisted_keys: Vec<KeyHash>,
}

impl Encodable for BlacklistDatum {}

impl BlacklistDatum {
    #[must_use]
    pub fn contains(&self, key: &KeyHash) -> bool {
        self.blacklisted_keys.contains(key)
    }

    /// The successor payload after applying `redeemer`: append on blacklist,
    /// remove on whitelist.
    #[must_use]
    pub fn apply(&self, redeemer: &BlacklistRedeemer) -> Self {
        let mut keys = self.blacklisted_keys.clone();
        match redeemer {
            BlacklistRedeemer::Blacklist(key) => {
                if !keys.contains(key) {
                    keys.push(*key);
                }
            }
            BlacklistRedeemer::Whitelist(key) => keys.retain(|existing| existing != key),
        }
        Self {
            blacklisted_keys: keys,
        }
    }
}

/// Blacklist update redeemer: a tagged choice of append or remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub enum BlacklistRedeemer {
    Blacklist(KeyHash),
    Whitelist(KeyHash),
}

impl Encodable for BlacklistRedeemer {}

/// The current live policy record of a token family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRecord {
    pub utxo: Utxo,
}

impl PolicyRecord {
    /// Decode the freeze payload.
    ///
    /// # Errors
    /// Returns error if the record has no datum or it does not decode.
    pub fn freeze_state(&self) -> Result<FreezeDatum, StoreError> {
        Ok(FreezeDatum::decode(self.datum()?)?)
    }

    /// Decode the blacklist payload.
    ///
    /// # Errors
    /// Returns error if the record has no datum or it does not decode.
    pub fn blacklist_state(&self) -> Result<BlacklistDatum, StoreError> {
        Ok(BlacklistDatum::decode(self.datum()?)?)
    }

    fn datum(&self) -> Result<&[u8], StoreError> {
        self.utxo
            .output
            .datum
            .as_deref()
            .ok_or(StoreError::Datum(ptoken_ledger::EncodingError::Decode(
                bincode::error::DecodeError::Other("policy record carries no datum"),
            )))
    }
}

/// Locate the unique live record carrying one unit of `validity`.
///
/// # Errors
/// Returns [`StoreError::NotFound`] when no record is live, and the fatal
/// [`StoreError::RecordNotUnique`] when the singleton invariant is broken.
pub fn read_record(
    client: &impl LedgerClient,
    record_address: &Address,
    validity: &AssetId,
) -> Result<PolicyRecord, StoreError> {
    let mut matches: Vec<Utxo> = client
        .utxos_at(record_address)?
        .into_iter()
        .filter(|utxo| utxo.asset(validity) > 0)
        .collect();

    match matches.len() {
        0 => Err(StoreError::NotFound {
            validity: validity.clone(),
        }),
        1 => Ok(PolicyRecord {
            utxo: matches.remove(0),
        }),
        count => Err(StoreError::RecordNotUnique {
            validity: validity.clone(),
            count,
        }),
    }
}
