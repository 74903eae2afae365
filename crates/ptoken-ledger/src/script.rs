//! Parameterized scripts and their identities.
//!
//! A script's code is the canonical encoding of its template identifier plus
//! the full tuple of applied parameters. Parameters are embedded into the code
//! before hashing, so distinct parameter tuples always yield distinct hashes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::encoding::Encodable;
use crate::error::EncodingError;
use crate::types::{Address, OutPoint, ScriptHash};

/// A script parameter, as embedded into script code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub enum ScriptParam {
    Bytes(Vec<u8>),
    Int(u64),
    OutPoint(OutPoint),
    Address(Address),
}

/// Structured script code: a template plus applied parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct ScriptCode {
    pub template_id: String,
    pub params: Vec<ScriptParam>,
}

impl Encodable for ScriptCode {}

impl ScriptCode {
    #[must_use]
    pub fn new(template_id: &str) -> Self {
        Self {
            template_id: template_id.to_string(),
            params: Vec::new(),
        }
    }
}

/// An attachable script: canonical code bytes, hashed into an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Script {
    code: Vec<u8>,
}

impl Script {
    /// Build from structured code.
    ///
    /// # Errors
    /// Returns error if the code fails to encode.
    pub fn from_code(code: &ScriptCode) -> Result<Self, EncodingError> {
        Ok(Self {
            code: code.encode()?,
        })
    }

    /// Wrap raw canonical code bytes, e.g. loaded from a blueprint.
    #[must_use]
    pub fn from_bytes(code: Vec<u8>) -> Self {
        Self { code }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    /// Recover the structured code.
    ///
    /// # Errors
    /// Returns error if the code bytes are not canonical script code.
    pub fn decode_code(&self) -> Result<ScriptCode, EncodingError> {
        ScriptCode::decode(&self.code)
    }

    /// Append parameters to the embedded tuple, producing a new script with
    /// a distinct hash for any distinct parameter list.
    ///
    /// # Errors
    /// Returns error if the existing code cannot be decoded or re-encoded.
    pub fn apply_params(&self, params: &[ScriptParam]) -> Result<Self, EncodingError> {
        let mut code = self.decode_code()?;
        code.params.extend_from_slice(params);
        Self::from_code(&code)
    }

    /// Script hash: SHA-256 of the code bytes, truncated to 28 bytes.
    #[must_use]
    pub fn hash(&self) -> ScriptHash {
        let digest = Sha256::digest(&self.code);
        let mut bytes = [0u8; 28];
        bytes.copy_from_slice(&digest[..28]);
        ScriptHash::new(bytes)
    }
}
