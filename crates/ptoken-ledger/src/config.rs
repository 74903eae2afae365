use std::env;
use std::str::FromStr;

const DEFAULT_CONFIRMATION_DEPTH: u32 = 1;
const DEFAULT_MIN_OUTPUT_LOVELACE: u64 = 2_000_000;
const DEFAULT_FLAT_FEE_LOVELACE: u64 = 200_000;

/// Errors from reading or validating ledger configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a valid integer, got '{value}'")]
    Parse { key: String, value: String },

    #[error("{0}")]
    Invalid(String),
}

/// Client-side ledger parameters shared by builders and emulators.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Confirmations to wait for before acting on a transaction's outputs.
    pub confirmation_depth: u32,
    /// Minimum base currency every output must carry.
    pub min_output_lovelace: u64,
    /// Flat base-currency fee charged per transaction.
    pub flat_fee_lovelace: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            confirmation_depth: DEFAULT_CONFIRMATION_DEPTH,
            min_output_lovelace: DEFAULT_MIN_OUTPUT_LOVELACE,
            flat_fee_lovelace: DEFAULT_FLAT_FEE_LOVELACE,
        }
    }
}

impl LedgerConfig {
    /// Read configuration from `PTOKEN_*` environment variables, falling
    /// back to defaults for unset or empty values.
    ///
    /// # Errors
    /// Returns error if a set variable fails to parse or validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            confirmation_depth: parse_env("PTOKEN_CONFIRMATION_DEPTH", DEFAULT_CONFIRMATION_DEPTH)?,
            min_output_lovelace: parse_env(
                "PTOKEN_MIN_OUTPUT_LOVELACE",
                DEFAULT_MIN_OUTPUT_LOVELACE,
            )?,
            flat_fee_lovelace: parse_env("PTOKEN_FLAT_FEE_LOVELACE", DEFAULT_FLAT_FEE_LOVELACE)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns error if any parameter is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmation_depth == 0 {
            return Err(ConfigError::Invalid(
                "PTOKEN_CONFIRMATION_DEPTH must be > 0".to_string(),
            ));
        }
        if self.min_output_lovelace == 0 {
            return Err(ConfigError::Invalid(
                "PTOKEN_MIN_OUTPUT_LOVELACE must be > 0".to_string(),
            ));
        }
        if self.flat_fee_lovelace == 0 {
            return Err(ConfigError::Invalid(
                "PTOKEN_FLAT_FEE_LOVELACE must be > 0".to_string(),
            ));
        }
        if self.flat_fee_lovelace >= self.min_output_lovelace {
            return Err(ConfigError::Invalid(
                "PTOKEN_FLAT_FEE_LOVELACE must be below PTOKEN_MIN_OUTPUT_LOVELACE".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr + Copy>(key: &str, default_value: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.parse().map_err(|_| ConfigError::Parse {
            key: key.to_string(),
            value: raw,
        }),
        _ => Ok(default_value),
    }
}
