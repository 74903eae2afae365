//! Core ledger types: hashes, addresses, multi-asset values, and outputs.

use std::collections::BTreeMap;
use std::fmt;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// Transaction identifier: SHA-256 of the canonical transaction encoding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct TxHash([u8; 32]);

impl TxHash {
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from a 64-character hex string.
    ///
    /// # Errors
    /// Returns error if the input is not valid hex of the exact length.
    pub fn from_hex(s: &str) -> Result<Self, EncodingError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Reference to a specific output of a prior transaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct OutPoint {
    pub tx_hash: TxHash,
    pub index: u32,
}

impl OutPoint {
    #[must_use]
    pub const fn new(tx_hash: TxHash, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.index)
    }
}

macro_rules! hash28 {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            Encode,
            Decode,
        )]
        pub struct $name([u8; 28]);

        impl $name {
            #[must_use]
            pub const fn new(bytes: [u8; 28]) -> Self {
                Self(bytes)
            }

            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; 28] {
                &self.0
            }

            /// Parse from a 56-character hex string.
            ///
            /// # Errors
            /// Returns error if the input is not valid hex of the exact length.
            pub fn from_hex(s: &str) -> Result<Self, EncodingError> {
                let mut bytes = [0u8; 28];
                hex::decode_to_slice(s, &mut bytes)?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }
    };
}

hash28! {
    /// Hash of a verification key; the ledger-level identity of a wallet.
    KeyHash
}

hash28! {
    /// Hash of a script's parameterized code.
    ScriptHash
}

hash28! {
    /// Minting-policy identifier; equal to the hash of the policy script.
    PolicyId
}

impl From<ScriptHash> for PolicyId {
    fn from(hash: ScriptHash) -> Self {
        Self(hash.0)
    }
}

/// Human-readable asset name within a policy, at most 32 bytes.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    /// Maximum length of an asset name in bytes.
    pub const MAX_LEN: usize = 32;

    /// Build from raw bytes, truncating past [`Self::MAX_LEN`].
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        let mut bytes = bytes;
        bytes.truncate(Self::MAX_LEN);
        Self(bytes)
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Fully qualified asset: minting policy plus name under that policy.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct AssetId {
    pub policy: PolicyId,
    pub name: AssetName,
}

impl AssetId {
    #[must_use]
    pub const fn new(policy: PolicyId, name: AssetName) -> Self {
        Self { policy, name }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.policy, self.name)
    }
}

/// Payment credential of an address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub enum Credential {
    Key(KeyHash),
    Script(ScriptHash),
}

/// A ledger address. Only the payment credential matters to this protocol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct Address {
    pub payment: Credential,
}

impl Address {
    #[must_use]
    pub const fn key(hash: KeyHash) -> Self {
        Self {
            payment: Credential::Key(hash),
        }
    }

    #[must_use]
    pub const fn script(hash: ScriptHash) -> Self {
        Self {
            payment: Credential::Script(hash),
        }
    }

    #[must_use]
    pub const fn key_hash(&self) -> Option<&KeyHash> {
        match &self.payment {
            Credential::Key(hash) => Some(hash),
            Credential::Script(_) => None,
        }
    }

    #[must_use]
    pub const fn script_hash(&self) -> Option<&ScriptHash> {
        match &self.payment {
            Credential::Script(hash) => Some(hash),
            Credential::Key(_) => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payment {
            Credential::Key(hash) => write!(f, "addr_vk{hash}"),
            Credential::Script(hash) => write!(f, "addr_sc{hash}"),
        }
    }
}

/// Multi-asset value: base currency (lovelace) plus per-asset quantities.
///
/// Zero quantities are never stored; two values compare equal iff they are
/// the same bundle.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode,
)]
pub struct Value {
    pub lovelace: u64,
    assets: BTreeMap<AssetId, u64>,
}

impl Value {
    #[must_use]
    pub const fn from_lovelace(lovelace: u64) -> Self {
        Self {
            lovelace,
            assets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_asset(asset: AssetId, quantity: u64) -> Self {
        let mut value = Self::default();
        value.set_asset(asset, quantity);
        value
    }

    /// Set the quantity of one asset, removing the entry when zero.
    pub fn set_asset(&mut self, asset: AssetId, quantity: u64) {
        if quantity == 0 {
            self.assets.remove(&asset);
        } else {
            self.assets.insert(asset, quantity);
        }
    }

    /// Builder-style variant of [`Self::set_asset`].
    #[must_use]
    pub fn with_asset(mut self, asset: AssetId, quantity: u64) -> Self {
        self.set_asset(asset, quantity);
        self
    }

    #[must_use]
    pub fn asset(&self, asset: &AssetId) -> u64 {
        self.assets.get(asset).copied().unwrap_or(0)
    }

    /// True when the value carries only base currency.
    #[must_use]
    pub fn is_lovelace_only(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn assets(&self) -> impl Iterator<Item = (&AssetId, u64)> {
        self.assets.iter().map(|(asset, quantity)| (asset, *quantity))
    }

    /// Add another value into this one, saturating on overflow.
    pub fn merge(&mut self, other: &Self) {
        self.lovelace = self.lovelace.saturating_add(other.lovelace);
        for (asset, quantity) in &other.assets {
            let total = self.asset(asset).saturating_add(*quantity);
            self.set_asset(asset.clone(), total);
        }
    }
}

/// A transaction output: where it pays, what it carries, and an optional
/// inline datum payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TxOut {
    pub address: Address,
    pub value: Value,
    pub datum: Option<Vec<u8>>,
}

impl TxOut {
    #[must_use]
    pub const fn new(address: Address, value: Value) -> Self {
        Self {
            address,
            value,
            datum: None,
        }
    }

    #[must_use]
    pub const fn with_datum(address: Address, value: Value, datum: Vec<u8>) -> Self {
        Self {
            address,
            value,
            datum: Some(datum),
        }
    }
}

/// An unspent output together with its ledger position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Utxo {
    pub outpoint: OutPoint,
    pub output: TxOut,
}

impl Utxo {
    #[must_use]
    pub const fn new(outpoint: OutPoint, output: TxOut) -> Self {
        Self { outpoint, output }
    }

    /// Hash of the transaction that produced this output.
    #[must_use]
    pub const fn origin(&self) -> TxHash {
        self.outpoint.tx_hash
    }

    #[must_use]
    pub fn asset(&self, asset: &AssetId) -> u64 {
        self.output.value.asset(asset)
    }

    #[must_use]
    pub const fn lovelace(&self) -> u64 {
        self.output.value.lovelace
    }
}
