//! Script derivation: template plus parameter tuple, deterministically hashed
//! into an address and asset-policy identity.
//!
//! Derivation is pure. Identical `(template, params)` pairs always produce the
//! identical identity, and any one-byte parameter difference produces a
//! distinct one, because parameters are embedded into the code before hashing.

use serde::{Deserialize, Serialize};

use ptoken_ledger::{Address, AssetId, AssetName, PolicyId, Script, ScriptHash, ScriptParam};

use crate::error::DeriveError;
use crate::templates;

/// Maps template identifiers to base (unparameterized) script code.
pub trait TemplateRepository {
    /// Base script for `template_id`.
    ///
    /// # Errors
    /// Returns [`DeriveError::UnknownTemplate`] if the id is not known.
    fn base_script(&self, template_id: &str) -> Result<Script, DeriveError>;
}

/// The full identity of a derived script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptIdentity {
    pub script: Script,
    pub code_hash: ScriptHash,
    pub address: Address,
    pub asset_policy: PolicyId,
}

/// Derive a script identity from a template and a parameter tuple.
///
/// # Errors
/// Returns error if `template_id` is unknown or parameter embedding fails.
pub fn derive(
    repo: &impl TemplateRepository,
    template_id: &str,
    params: &[ScriptParam],
) -> Result<ScriptIdentity, DeriveError> {
    let script = repo.base_script(template_id)?.apply_params(params)?;
    let code_hash = script.hash();
    Ok(ScriptIdentity {
        address: Address::script(code_hash),
        asset_policy: PolicyId::from(code_hash),
        script,
        code_hash,
    })
}

/// Everything needed to mint under a derived policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintingPolicyArtifact {
    pub script: Script,
    pub policy: PolicyId,
    pub asset: AssetId,
}

/// Everything needed to pay to or spend from a derived validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorArtifact {
    pub script: Script,
    pub hash: ScriptHash,
    pub address: Address,
}

/// Derive a minting policy and the asset it controls.
///
/// # Errors
/// Returns error if derivation fails.
pub fn minting_policy(
    repo: &impl TemplateRepository,
    template_id: &str,
    asset_name: AssetName,
    params: &[ScriptParam],
) -> Result<MintingPolicyArtifact, DeriveError> {
    let identity = derive(repo, template_id, params)?;
    Ok(MintingPolicyArtifact {
        asset: AssetId::new(identity.asset_policy, asset_name),
        policy: identity.asset_policy,
        script: identity.script,
    })
}

/// Derive a spending validator and its address.
///
/// # Errors
/// Returns error if derivation fails.
pub fn validator(
    repo: &impl TemplateRepository,
    template_id: &str,
    params: &[ScriptParam],
) -> Result<ValidatorArtifact, DeriveError> {
    let identity = derive(repo, template_id, params)?;
    Ok(ValidatorArtifact {
        script: identity.script,
        hash: identity.code_hash,
        address: identity.address,
    })
}

/// A JSON-loadable script repository, one entry per template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    pub validators: Vec<BlueprintValidator>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintValidator {
    pub title: String,
    /// Canonical script code bytes, hex encoded.
    pub compiled_code: String,
    /// Hash of the unparameterized code, hex encoded.
    pub hash: String,
}

impl Blueprint {
    /// The built-in blueprint carrying every template in [`templates::ALL`].
    ///
    /// # Panics
    /// Panics if the embedded templates fail to encode (should never happen).
    #[must_use]
    pub fn builtin() -> Self {
        let validators = templates::ALL
            .iter()
            .map(|template_id| {
                let script =
                    Script::from_code(&ptoken_ledger::ScriptCode::new(template_id))
                        .expect("INTERNAL: expected builtin template to encode");
                BlueprintValidator {
                    title: (*template_id).to_string(),
                    compiled_code: hex::encode(script.as_bytes()),
                    hash: script.hash().to_string(),
                }
            })
            .collect();
        Self { validators }
    }

    /// Parse a blueprint from JSON.
    ///
    /// # Errors
    /// Returns error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, DeriveError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the blueprint as JSON.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, DeriveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TemplateRepository for Blueprint {
    fn base_script(&self, template_id: &str) -> Result<Script, DeriveError> {
        let entry = self
            .validators
            .iter()
            .find(|validator| validator.title == template_id)
            .ok_or_else(|| DeriveError::UnknownTemplate {
                template_id: template_id.to_string(),
            })?;
        let code = hex::decode(&entry.compiled_code)
            .map_err(ptoken_ledger::EncodingError::from)
            .map_err(DeriveError::from)?;
        Ok(Script::from_bytes(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptoken_ledger::OutPoint;
    use ptoken_ledger::TxHash;

    fn seed(tag: u8) -> ScriptParam {
        ScriptParam::OutPoint(OutPoint::new(TxHash::new([tag; 32]), 0))
    }

    #[test]
    fn derivation_is_deterministic() -> anyhow::Result<()> {
        let repo = Blueprint::builtin();
        let left = derive(&repo, templates::TOKEN_MINT, &[seed(1)])?;
        let right = derive(&repo, templates::TOKEN_MINT, &[seed(1)])?;
        assert_eq!(left, right);
        Ok(())
    }

    #[test]
    fn distinct_seeds_give_distinct_policies() -> anyhow::Result<()> {
        let repo = Blueprint::builtin();
        let left = derive(&repo, templates::TOKEN_MINT, &[seed(1)])?;
        let right = derive(&repo, templates::TOKEN_MINT, &[seed(2)])?;
        assert_ne!(left.asset_policy, right.asset_policy);
        assert_ne!(left.address, right.address);
        Ok(())
    }

    #[test]
    fn unknown_template_is_rejected() {
        let repo = Blueprint::builtin();
        let err = derive(&repo, "no_such.template", &[]).expect_err("must fail");
        assert!(matches!(err, DeriveError::UnknownTemplate { .. }));
    }

    #[test]
    fn blueprint_survives_json_round_trip() -> anyhow::Result<()> {
        let blueprint = Blueprint::builtin();
        let reloaded = Blueprint::from_json(&blueprint.to_json()?)?;

        let left = derive(&blueprint, templates::PROOF_MINT, &[])?;
        let right = derive(&reloaded, templates::PROOF_MINT, &[])?;
        assert_eq!(left.code_hash, right.code_hash);
        Ok(())
    }
}
