//! Transaction assembly: pure composition of inputs, read-only references,
//! outputs, mints, scripts, and required signers. Balancing (fee inputs and
//! change) belongs to the ledger client, not to this builder.

use ptoken_ledger::{
    Address, AssetId, KeyHash, MintIntent, Script, Transaction, TxIn, TxOut, Utxo, Value,
};

/// Chainable builder producing an unbalanced candidate [`Transaction`].
#[derive(Debug, Default, Clone)]
pub struct TxAssembler {
    tx: Transaction,
}

impl TxAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spend `utxo` without a redeemer (key-owned outputs).
    #[must_use]
    pub fn collect(mut self, utxo: &Utxo) -> Self {
        self.tx.inputs.push(TxIn::new(utxo.outpoint));
        self
    }

    /// Spend `utxo` with a redeemer (script-owned outputs).
    #[must_use]
    pub fn collect_with_redeemer(mut self, utxo: &Utxo, redeemer: Vec<u8>) -> Self {
        self.tx
            .inputs
            .push(TxIn::with_redeemer(utxo.outpoint, redeemer));
        self
    }

    /// Observe `utxo` read-only, without consuming it.
    #[must_use]
    pub fn read_from(mut self, utxo: &Utxo) -> Self {
        if !self.tx.reference_inputs.contains(&utxo.outpoint) {
            self.tx.reference_inputs.push(utxo.outpoint);
        }
        self
    }

    #[must_use]
    pub fn pay_to_address(mut self, address: Address, value: Value) -> Self {
        self.tx.outputs.push(TxOut::new(address, value));
        self
    }

    #[must_use]
    pub fn pay_to_contract(mut self, address: Address, value: Value, datum: Vec<u8>) -> Self {
        self.tx.outputs.push(TxOut::with_datum(address, value, datum));
        self
    }

    #[must_use]
    pub fn mint(mut self, asset: AssetId, amount: i64, redeemer: Option<Vec<u8>>) -> Self {
        self.tx.mints.push(MintIntent {
            asset,
            amount,
            redeemer,
        });
        self
    }

    /// Attach validator or policy code; duplicates are dropped.
    #[must_use]
    pub fn attach_script(mut self, script: &Script) -> Self {
        if !self.tx.scripts.contains(script) {
            self.tx.scripts.push(script.clone());
        }
        self
    }

    /// Declare a signer the transaction must carry; duplicates are dropped.
    #[must_use]
    pub fn add_signer(mut self, key: KeyHash) -> Self {
        if !self.tx.required_signers.contains(&key) {
            self.tx.required_signers.push(key);
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Transaction {
        self.tx
    }
}
