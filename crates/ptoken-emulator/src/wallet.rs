//! Deterministic test identities.

use sha2::{Digest, Sha256};

use ptoken_ledger::{Address, KeyHash};

/// A wallet identity derived from a seed phrase. The same seed always yields
/// the same key hash, so tests can name their actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    pub key: KeyHash,
    pub address: Address,
}

impl Account {
    #[must_use]
    pub fn from_seed(seed: &str) -> Self {
        let digest = Sha256::digest(seed.as_bytes());
        let mut bytes = [0u8; 28];
        bytes.copy_from_slice(&digest[..28]);
        let key = KeyHash::new(bytes);
        Self {
            key,
            address: Address::key(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_name_stable_identities() {
        assert_eq!(Account::from_seed("alice"), Account::from_seed("alice"));
        assert_ne!(
            Account::from_seed("alice").key,
            Account::from_seed("bob").key
        );
    }

    #[test]
    fn address_carries_the_key_credential() {
        let account = Account::from_seed("alice");
        assert_eq!(account.address.key_hash(), Some(&account.key));
    }
}
