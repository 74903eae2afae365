//! Token family bootstrap derivation: the fixed set of scripts every policy
//! variant hangs off one or two one-time seed outpoints.

use ptoken_ledger::{Address, AssetId, AssetName, KeyHash, OutPoint, ScriptParam};

use crate::deriver::{
    MintingPolicyArtifact, TemplateRepository, ValidatorArtifact, minting_policy, validator,
};
use crate::error::DeriveError;
use crate::templates;

/// The shared, unparameterized proof scripts: the proof-validity marker (PVT)
/// policy and the proof output validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofTemplates {
    pub marker: MintingPolicyArtifact,
    pub validator: ValidatorArtifact,
}

/// Derive the proof marker policy and proof validator.
///
/// # Errors
/// Returns error if derivation fails.
pub fn proof_templates(repo: &impl TemplateRepository) -> Result<ProofTemplates, DeriveError> {
    Ok(ProofTemplates {
        marker: minting_policy(
            repo,
            templates::PROOF_MINT,
            AssetName::from_text(templates::PROOF_MARKER_NAME),
            &[],
        )?,
        validator: validator(repo, templates::PROOF_SPEND, &[])?,
    })
}

/// The policy-record scripts of one family: the validity marker policy and
/// the record validator holding the live record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordScripts {
    pub validity: MintingPolicyArtifact,
    pub validator: ValidatorArtifact,
}

impl RecordScripts {
    fn derive(
        repo: &impl TemplateRepository,
        mint_template: &str,
        spend_template: &str,
        marker_name: &str,
        admin: KeyHash,
        seed: OutPoint,
    ) -> Result<Self, DeriveError> {
        let params = [
            ScriptParam::OutPoint(seed),
            ScriptParam::Bytes(admin.as_bytes().to_vec()),
        ];
        Ok(Self {
            validity: minting_policy(
                repo,
                mint_template,
                AssetName::from_text(marker_name),
                &params,
            )?,
            validator: validator(repo, spend_template, &params)?,
        })
    }
}

/// Where a transfer must look for the current policy record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLocator {
    pub address: Address,
    pub validity: AssetId,
}

/// A mandatory per-transfer payment to the fee treasury.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeePayment {
    pub destination: Address,
    pub amount: u64,
}

/// One policy a covered transfer must satisfy: the check marker to mint,
/// the record to reference (if the policy keeps one), and the fee output to
/// include (if the policy charges one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverPolicy {
    pub check: MintingPolicyArtifact,
    pub record: Option<RecordLocator>,
    pub fee: Option<FeePayment>,
}

/// A freezable token family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezableFamily {
    pub record: RecordScripts,
    pub token: MintingPolicyArtifact,
    pub check: MintingPolicyArtifact,
    pub admin: KeyHash,
}

impl FreezableFamily {
    /// Derive the record scripts from the record seed. This happens before
    /// the token exists; the token derivation consumes a second seed.
    ///
    /// # Errors
    /// Returns error if derivation fails.
    pub fn derive_record(
        repo: &impl TemplateRepository,
        admin: KeyHash,
        seed: OutPoint,
    ) -> Result<RecordScripts, DeriveError> {
        RecordScripts::derive(
            repo,
            templates::FREEZE_RECORD_MINT,
            templates::FREEZE_RECORD_SPEND,
            templates::FREEZE_MARKER_NAME,
            admin,
            seed,
        )
    }

    /// Derive the token policy and its freeze-check policy.
    ///
    /// # Errors
    /// Returns error if derivation fails.
    pub fn derive(
        repo: &impl TemplateRepository,
        record: RecordScripts,
        admin: KeyHash,
        token_name: &str,
        token_seed: OutPoint,
    ) -> Result<Self, DeriveError> {
        let token = minting_policy(
            repo,
            templates::TOKEN_MINT,
            AssetName::from_text(token_name),
            &[ScriptParam::OutPoint(token_seed)],
        )?;
        let check = minting_policy(
            repo,
            templates::FREEZE_CHECK,
            AssetName::new(token.policy.as_bytes().to_vec()),
            &[
                ScriptParam::Bytes(record.validity.policy.as_bytes().to_vec()),
                ScriptParam::Bytes(record.validity.asset.name.as_bytes().to_vec()),
                ScriptParam::Bytes(token.policy.as_bytes().to_vec()),
            ],
        )?;
        Ok(Self {
            record,
            token,
            check,
            admin,
        })
    }

    #[must_use]
    pub fn cover_policy(&self) -> CoverPolicy {
        CoverPolicy {
            check: self.check.clone(),
            record: Some(RecordLocator {
                address: self.record.validator.address,
                validity: self.record.validity.asset.clone(),
            }),
            fee: None,
        }
    }
}

/// A blacklist token family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistFamily {
    pub record: RecordScripts,
    pub token: MintingPolicyArtifact,
    pub check: MintingPolicyArtifact,
    pub admin: KeyHash,
}

impl BlacklistFamily {
    /// Derive the record scripts from the record seed.
    ///
    /// # Errors
    /// Returns error if derivation fails.
    pub fn derive_record(
        repo: &impl TemplateRepository,
        admin: KeyHash,
        seed: OutPoint,
    ) -> Result<RecordScripts, DeriveError> {
        RecordScripts::derive(
            repo,
            templates::BLACKLIST_RECORD_MINT,
            templates::BLACKLIST_RECORD_SPEND,
            templates::BLACKLIST_MARKER_NAME,
            admin,
            seed,
        )
    }

    /// Derive the token policy and its blacklist-check policy.
    ///
    /// # Errors
    /// Returns error if derivation fails.
    pub fn derive(
        repo: &impl TemplateRepository,
        record: RecordScripts,
        admin: KeyHash,
        token_name: &str,
        token_seed: OutPoint,
    ) -> Result<Self, DeriveError> {
        let token = minting_policy(
            repo,
            templates::TOKEN_MINT,
            AssetName::from_text(token_name),
            &[ScriptParam::OutPoint(token_seed)],
        )?;
        let check = minting_policy(
            repo,
            templates::BLACKLIST_CHECK,
            AssetName::new(token.policy.as_bytes().to_vec()),
            &[
                ScriptParam::Bytes(record.validity.policy.as_bytes().to_vec()),
                ScriptParam::Bytes(record.validity.asset.name.as_bytes().to_vec()),
                ScriptParam::Bytes(token.policy.as_bytes().to_vec()),
            ],
        )?;
        Ok(Self {
            record,
            token,
            check,
            admin,
        })
    }

    #[must_use]
    pub fn cover_policy(&self) -> CoverPolicy {
        CoverPolicy {
            check: self.check.clone(),
            record: Some(RecordLocator {
                address: self.record.validator.address,
                validity: self.record.validity.asset.clone(),
            }),
            fee: None,
        }
    }
}

/// A fee-on-transfer token family. The fee schedule is fixed at bootstrap:
/// it lives in the check policy's parameters, not in a mutable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeFamily {
    pub token: MintingPolicyArtifact,
    pub check: MintingPolicyArtifact,
    pub treasury: ValidatorArtifact,
    pub fee_amount: u64,
    pub admin: KeyHash,
}

impl FeeFamily {
    /// Derive the token, treasury, and fee-check scripts from one seed.
    ///
    /// # Errors
    /// Returns error if derivation fails.
    pub fn derive(
        repo: &impl TemplateRepository,
        admin: KeyHash,
        token_name: &str,
        fee_amount: u64,
        seed: OutPoint,
    ) -> Result<Self, DeriveError> {
        let token = minting_policy(
            repo,
            templates::TOKEN_MINT,
            AssetName::from_text(token_name),
            &[ScriptParam::OutPoint(seed)],
        )?;
        let treasury = validator(
            repo,
            templates::FEE_TREASURY_SPEND,
            &[
                ScriptParam::Bytes(admin.as_bytes().to_vec()),
                ScriptParam::Bytes(token.policy.as_bytes().to_vec()),
            ],
        )?;
        let check = minting_policy(
            repo,
            templates::FEE_CHECK,
            AssetName::new(token.policy.as_bytes().to_vec()),
            &[
                ScriptParam::Address(treasury.address),
                ScriptParam::Int(fee_amount),
                ScriptParam::Bytes(token.policy.as_bytes().to_vec()),
            ],
        )?;
        Ok(Self {
            token,
            check,
            treasury,
            fee_amount,
            admin,
        })
    }

    #[must_use]
    pub const fn fee_destination(&self) -> Address {
        self.treasury.address
    }

    #[must_use]
    pub fn cover_policy(&self) -> CoverPolicy {
        CoverPolicy {
            check: self.check.clone(),
            record: None,
            fee: Some(FeePayment {
                destination: self.treasury.address,
                amount: self.fee_amount,
            }),
        }
    }
}

/// Derive an unrestricted plain-token policy from a bootstrap word. Reusing
/// the word yields the same policy; a different word yields a different one.
///
/// # Errors
/// Returns error if derivation fails.
pub fn plain_token(
    repo: &impl TemplateRepository,
    word: &str,
) -> Result<MintingPolicyArtifact, DeriveError> {
    minting_policy(
        repo,
        templates::FREE_MINT,
        AssetName::from_text(word),
        &[ScriptParam::Bytes(word.as_bytes().to_vec())],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deriver::Blueprint;
    use ptoken_ledger::TxHash;

    fn outpoint(tag: u8) -> OutPoint {
        OutPoint::new(TxHash::new([tag; 32]), 0)
    }

    #[test]
    fn families_from_distinct_seeds_are_independent() -> anyhow::Result<()> {
        let repo = Blueprint::builtin();
        let admin = KeyHash::new([7; 28]);

        let record_a = FreezableFamily::derive_record(&repo, admin, outpoint(1))?;
        let record_b = FreezableFamily::derive_record(&repo, admin, outpoint(2))?;
        let family_a = FreezableFamily::derive(&repo, record_a, admin, "X", outpoint(3))?;
        let family_b = FreezableFamily::derive(&repo, record_b, admin, "X", outpoint(4))?;

        assert_ne!(family_a.token.policy, family_b.token.policy);
        assert_ne!(family_a.check.policy, family_b.check.policy);
        assert_ne!(
            family_a.record.validator.address,
            family_b.record.validator.address
        );
        Ok(())
    }

    #[test]
    fn check_marker_name_is_token_policy() -> anyhow::Result<()> {
        let repo = Blueprint::builtin();
        let admin = KeyHash::new([7; 28]);
        let family = FeeFamily::derive(&repo, admin, "FT", 5_000_000, outpoint(1))?;
        assert_eq!(
            family.check.asset.name.as_bytes(),
            family.token.policy.as_bytes()
        );
        Ok(())
    }

    #[test]
    fn plain_token_word_determines_policy() -> anyhow::Result<()> {
        let repo = Blueprint::builtin();
        assert_eq!(
            plain_token(&repo, "word")?.policy,
            plain_token(&repo, "word")?.policy
        );
        assert_ne!(
            plain_token(&repo, "word")?.policy,
            plain_token(&repo, "other")?.policy
        );
        Ok(())
    }
}
