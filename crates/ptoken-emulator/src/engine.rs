//! The validator engine: every predicate that decides whether a balanced
//! transaction may commit.
//!
//! Scripts are interpreted by template identifier. A script only ever enters
//! the store by being attached to a committed transaction, so the engine sees
//! exactly the code whose hash guards an output or names a minting policy.

use std::collections::BTreeMap;

use ptoken_ledger::{
    Address, AssetId, AssetName, Credential, Decode, Encodable, KeyHash, LedgerError, OutPoint,
    PolicyId, Script, ScriptCode, ScriptHash, ScriptParam, Transaction, TxOut, Utxo, Value,
};

use ptoken_contracts::records::{BlacklistDatum, BlacklistRedeemer, FreezeDatum};
use ptoken_contracts::templates;

/// A candidate transaction with its spent and referenced outputs resolved,
/// plus the keys that actually signed it.
pub(crate) struct TxView<'a> {
    pub tx: &'a Transaction,
    pub inputs: &'a [Utxo],
    pub references: &'a [Utxo],
    pub signers: &'a [KeyHash],
}

fn reject(reason: impl Into<String>) -> LedgerError {
    LedgerError::EngineRejected {
        reason: reason.into(),
    }
}

/// Address of the shared proof validator. Unparameterized, so it is the same
/// for every token family.
pub(crate) fn proof_validator_address() -> Result<Address, LedgerError> {
    let script = Script::from_code(&ScriptCode::new(templates::PROOF_SPEND))?;
    Ok(Address::script(script.hash()))
}

/// Run every predicate against `view`. Order is immaterial; the first failure
/// rejects the whole transaction.
pub(crate) fn validate(
    view: &TxView<'_>,
    scripts: &BTreeMap<ScriptHash, ScriptCode>,
) -> Result<(), LedgerError> {
    check_required_signers(view)?;
    check_asset_preservation(view)?;
    for mint in &view.tx.mints {
        check_mint(view, scripts, &mint.asset)?;
    }
    check_spends(view, scripts)?;
    check_covering(view, scripts)?;
    Ok(())
}

fn check_required_signers(view: &TxView<'_>) -> Result<(), LedgerError> {
    for required in &view.tx.required_signers {
        if !view.signers.contains(required) {
            return Err(reject(format!("missing signature from {required}")));
        }
    }
    Ok(())
}

/// Per asset: inputs plus net mint must equal outputs exactly. Base currency
/// is settled by balancing and not re-checked here.
fn check_asset_preservation(view: &TxView<'_>) -> Result<(), LedgerError> {
    let mut net: BTreeMap<AssetId, i128> = BTreeMap::new();
    for input in view.inputs {
        for (asset, quantity) in input.output.value.assets() {
            *net.entry(asset.clone()).or_default() += i128::from(quantity);
        }
    }
    for mint in &view.tx.mints {
        *net.entry(mint.asset.clone()).or_default() += i128::from(mint.amount);
    }
    for output in &view.tx.outputs {
        for (asset, quantity) in output.value.assets() {
            *net.entry(asset.clone()).or_default() -= i128::from(quantity);
        }
    }
    for (asset, imbalance) in net {
        if imbalance != 0 {
            return Err(reject(format!("value not preserved for asset {asset}")));
        }
    }
    Ok(())
}

fn check_mint(
    view: &TxView<'_>,
    scripts: &BTreeMap<ScriptHash, ScriptCode>,
    asset: &AssetId,
) -> Result<(), LedgerError> {
    let code = policy_script(scripts, asset.policy)
        .ok_or_else(|| reject(format!("no script attached for policy {}", asset.policy)))?;

    match code.template_id.as_str() {
        templates::FREE_MINT => Ok(()),
        templates::TOKEN_MINT
        | templates::FREEZE_RECORD_MINT
        | templates::BLACKLIST_RECORD_MINT => {
            let seed = outpoint_param(code, 0)?;
            if view.tx.inputs.iter().any(|input| input.outpoint == seed) {
                Ok(())
            } else {
                Err(reject(format!(
                    "one-shot policy {} requires spending its seed {seed}",
                    asset.policy
                )))
            }
        }
        templates::FREEZE_CHECK => {
            let record = referenced_record(view, code)?;
            let state: FreezeDatum = record_datum(record)?;
            if state.is_frozen {
                return Err(reject("token family is frozen"));
            }
            check_marker_placement(view, asset)
        }
        templates::BLACKLIST_CHECK => {
            let record = referenced_record(view, code)?;
            let state: BlacklistDatum = record_datum(record)?;
            let token_policy = policy_param(code, 2)?;
            check_blacklist_holders(view, &state, token_policy)?;
            check_marker_placement(view, asset)
        }
        templates::FEE_CHECK => {
            let destination = address_param(code, 0)?;
            let amount = int_param(code, 1)?;
            let paid = view
                .tx
                .outputs
                .iter()
                .any(|output| output.address == destination && output.value.lovelace >= amount);
            if !paid {
                return Err(reject(format!(
                    "mandatory transfer fee of {amount} to {destination} is missing"
                )));
            }
            check_marker_placement(view, asset)
        }
        templates::PROOF_MINT => check_marker_placement(view, asset),
        other => Err(reject(format!("template {other} is not a minting policy"))),
    }
}

/// Every output holding a freshly minted proof or check marker must sit at
/// the proof validator; markers never circulate on their own.
fn check_marker_placement(view: &TxView<'_>, asset: &AssetId) -> Result<(), LedgerError> {
    let proof_address = proof_validator_address()?;
    for output in &view.tx.outputs {
        if output.value.asset(asset) > 0 && output.address != proof_address {
            return Err(reject(format!(
                "minted marker {asset} must sit at the proof validator address"
            )));
        }
    }
    Ok(())
}

/// Neither side of a transfer may be blacklisted: every key-owned input and
/// output carrying the token policy is screened against the record.
fn check_blacklist_holders(
    view: &TxView<'_>,
    state: &BlacklistDatum,
    token_policy: PolicyId,
) -> Result<(), LedgerError> {
    let holders = view
        .inputs
        .iter()
        .map(|input| &input.output)
        .chain(view.tx.outputs.iter())
        .filter(|output| holds_policy(&output.value, token_policy));
    for holder in holders {
        if let Some(key) = holder.address.key_hash() {
            if state.contains(key) {
                return Err(reject(format!("identity {key} is blacklisted")));
            }
        }
    }
    Ok(())
}

fn check_spends(
    view: &TxView<'_>,
    scripts: &BTreeMap<ScriptHash, ScriptCode>,
) -> Result<(), LedgerError> {
    for (txin, utxo) in view.tx.inputs.iter().zip(view.inputs) {
        match utxo.output.address.payment {
            Credential::Key(key) => {
                if !view.signers.contains(&key) {
                    return Err(reject(format!("missing signature from owner {key}")));
                }
            }
            Credential::Script(hash) => {
                let code = scripts
                    .get(&hash)
                    .ok_or_else(|| reject(format!("no script attached for guard {hash}")))?;
                check_script_spend(view, utxo, code, txin.redeemer.as_deref())?;
            }
        }
    }
    Ok(())
}

fn check_script_spend(
    view: &TxView<'_>,
    utxo: &Utxo,
    code: &ScriptCode,
    redeemer: Option<&[u8]>,
) -> Result<(), LedgerError> {
    match code.template_id.as_str() {
        templates::PROOF_SPEND => Ok(()),
        templates::FEE_TREASURY_SPEND => {
            let admin = key_param(code, 0)?;
            if view.signers.contains(&admin) {
                Ok(())
            } else {
                Err(reject("treasury withdrawal requires the admin signature"))
            }
        }
        templates::FREEZE_RECORD_SPEND => {
            let successor = check_record_replacement(
                view,
                utxo,
                code,
                templates::FREEZE_RECORD_MINT,
                templates::FREEZE_MARKER_NAME,
            )?;
            let _: FreezeDatum = record_datum(successor)?;
            Ok(())
        }
        templates::BLACKLIST_RECORD_SPEND => {
            let successor = check_record_replacement(
                view,
                utxo,
                code,
                templates::BLACKLIST_RECORD_MINT,
                templates::BLACKLIST_MARKER_NAME,
            )?;
            let next: BlacklistDatum = record_datum(successor)?;
            match redeemer {
                Some(bytes) if !bytes.is_empty() => {
                    let step = <BlacklistRedeemer as Encodable>::decode(bytes)
                        .map_err(|_| reject("blacklist redeemer does not decode"))?;
                    let previous: BlacklistDatum = record_datum(&utxo.output)?;
                    if next == previous.apply(&step) {
                        Ok(())
                    } else {
                        Err(reject("blacklist successor does not match the redeemer"))
                    }
                }
                _ => Err(reject("blacklist update requires a redeemer")),
            }
        }
        other => Err(reject(format!(
            "outputs guarded by {other} cannot be spent"
        ))),
    }
}

/// A record spend must be signed by the admin and produce exactly one
/// successor at the same address still carrying the validity marker. The
/// marker's policy is recovered by re-deriving the sibling mint template
/// under the identical parameter tuple.
fn check_record_replacement<'a>(
    view: &'a TxView<'_>,
    utxo: &Utxo,
    code: &ScriptCode,
    mint_template: &str,
    marker_name: &str,
) -> Result<&'a TxOut, LedgerError> {
    let admin = key_param(code, 1)?;
    if !view.signers.contains(&admin) {
        return Err(reject("record update requires the admin signature"));
    }

    let sibling = Script::from_code(&ScriptCode {
        template_id: mint_template.to_string(),
        params: code.params.clone(),
    })?;
    let validity = AssetId::new(
        PolicyId::from(sibling.hash()),
        AssetName::from_text(marker_name),
    );

    let mut successors = view.tx.outputs.iter().filter(|output| {
        output.address == utxo.output.address && output.value.asset(&validity) > 0
    });
    match (successors.next(), successors.next()) {
        (Some(successor), None) => Ok(successor),
        (None, _) => Err(reject("record replacement must keep the validity marker")),
        (Some(_), Some(_)) => Err(reject(
            "record replacement must produce exactly one successor",
        )),
    }
}

/// The covering rule. Spending an output holding a programmable token takes
/// two things per applicable check marker: a referenced live proof created in
/// the same transaction as the spent output and carrying the marker, and a
/// fresh mint of exactly one unit of that marker (plus the proof marker) in
/// the spending transaction itself. The fresh mint is what runs the policy
/// predicate against the current record; a pre-existing proof alone reflects
/// the record as it stood when the output was created.
fn check_covering(
    view: &TxView<'_>,
    scripts: &BTreeMap<ScriptHash, ScriptCode>,
) -> Result<(), LedgerError> {
    let proof_address = proof_validator_address()?;
    let proof_marker = proof_marker_asset()?;
    for input in view.inputs {
        for (asset, _) in input.output.value.assets() {
            let Some(code) = policy_script(scripts, asset.policy) else {
                continue;
            };
            if code.template_id != templates::TOKEN_MINT {
                continue;
            }
            let markers = applicable_check_markers(scripts, asset.policy);
            for marker in &markers {
                let covered = view.references.iter().any(|proof| {
                    proof.output.address == proof_address
                        && proof.origin() == input.origin()
                        && proof.asset(marker) > 0
                });
                if !covered {
                    return Err(reject(format!(
                        "spent output {} has no correlated proof carrying {marker}",
                        input.outpoint
                    )));
                }
                if view.tx.minted(marker) != 1 {
                    return Err(reject(format!(
                        "spending {} requires freshly minting one {marker}",
                        input.outpoint
                    )));
                }
            }
            if !markers.is_empty() && view.tx.minted(&proof_marker) < 1 {
                return Err(reject(format!(
                    "spending {} requires a fresh proof output in this transaction",
                    input.outpoint
                )));
            }
        }
    }
    Ok(())
}

/// Identity of the proof-validity marker, shared by every family.
fn proof_marker_asset() -> Result<AssetId, LedgerError> {
    let script = Script::from_code(&ScriptCode::new(templates::PROOF_MINT))?;
    Ok(AssetId::new(
        PolicyId::from(script.hash()),
        AssetName::from_text(templates::PROOF_MARKER_NAME),
    ))
}

/// Check markers that apply to `token_policy`: every known check policy whose
/// final parameter names this token policy.
fn applicable_check_markers(
    scripts: &BTreeMap<ScriptHash, ScriptCode>,
    token_policy: PolicyId,
) -> Vec<AssetId> {
    scripts
        .iter()
        .filter(|(_, code)| {
            matches!(
                code.template_id.as_str(),
                templates::FREEZE_CHECK | templates::BLACKLIST_CHECK | templates::FEE_CHECK
            )
        })
        .filter(|(_, code)| {
            matches!(code.params.last(), Some(ScriptParam::Bytes(bytes))
                if bytes.as_slice() == token_policy.as_bytes())
        })
        .map(|(hash, _)| {
            AssetId::new(
                PolicyId::new(*hash.as_bytes()),
                AssetName::new(token_policy.as_bytes().to_vec()),
            )
        })
        .collect()
}

fn referenced_record<'a>(
    view: &'a TxView<'_>,
    code: &ScriptCode,
) -> Result<&'a TxOut, LedgerError> {
    let validity = AssetId::new(
        policy_param(code, 0)?,
        AssetName::new(bytes_param(code, 1)?.to_vec()),
    );
    view.references
        .iter()
        .find(|reference| reference.asset(&validity) > 0)
        .map(|reference| &reference.output)
        .ok_or_else(|| reject(format!("no referenced policy record carries {validity}")))
}

fn record_datum<T: Encodable + Decode<()>>(output: &TxOut) -> Result<T, LedgerError> {
    let datum = output
        .datum
        .as_deref()
        .ok_or_else(|| reject("policy record carries no datum"))?;
    <T as Encodable>::decode(datum).map_err(|_| reject("policy record datum does not decode"))
}

fn holds_policy(value: &Value, policy: PolicyId) -> bool {
    value.assets().any(|(asset, _)| asset.policy == policy)
}

fn policy_script(
    scripts: &BTreeMap<ScriptHash, ScriptCode>,
    policy: PolicyId,
) -> Option<&ScriptCode> {
    scripts.get(&ScriptHash::new(*policy.as_bytes()))
}

fn param(code: &ScriptCode, index: usize) -> Result<&ScriptParam, LedgerError> {
    code.params.get(index).ok_or_else(|| {
        reject(format!(
            "template {} is missing parameter {index}",
            code.template_id
        ))
    })
}

fn bytes_param(code: &ScriptCode, index: usize) -> Result<&[u8], LedgerError> {
    match param(code, index)? {
        ScriptParam::Bytes(bytes) => Ok(bytes),
        _ => Err(reject(format!(
            "template {} parameter {index} is not bytes",
            code.template_id
        ))),
    }
}

fn key_param(code: &ScriptCode, index: usize) -> Result<KeyHash, LedgerError> {
    let bytes = <[u8; 28]>::try_from(bytes_param(code, index)?)
        .map_err(|_| reject("key parameter has the wrong length"))?;
    Ok(KeyHash::new(bytes))
}

fn policy_param(code: &ScriptCode, index: usize) -> Result<PolicyId, LedgerError> {
    let bytes = <[u8; 28]>::try_from(bytes_param(code, index)?)
        .map_err(|_| reject("policy parameter has the wrong length"))?;
    Ok(PolicyId::new(bytes))
}

fn int_param(code: &ScriptCode, index: usize) -> Result<u64, LedgerError> {
    match param(code, index)? {
        ScriptParam::Int(value) => Ok(*value),
        _ => Err(reject(format!(
            "template {} parameter {index} is not an integer",
            code.template_id
        ))),
    }
}

fn address_param(code: &ScriptCode, index: usize) -> Result<Address, LedgerError> {
    match param(code, index)? {
        ScriptParam::Address(address) => Ok(*address),
        _ => Err(reject(format!(
            "template {} parameter {index} is not an address",
            code.template_id
        ))),
    }
}

fn outpoint_param(code: &ScriptCode, index: usize) -> Result<OutPoint, LedgerError> {
    match param(code, index)? {
        ScriptParam::OutPoint(outpoint) => Ok(*outpoint),
        _ => Err(reject(format!(
            "template {} parameter {index} is not an outpoint",
            code.template_id
        ))),
    }
}
