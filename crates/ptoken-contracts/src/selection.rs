//! Wallet UTXO selection: fee fodder and token-bearing inputs.

use ptoken_ledger::{AssetId, Utxo};

use crate::error::SelectionError;

/// Outputs holding only base currency, usable for fees and balancing.
/// An empty result means the wallet needs a fee fan-out first (see
/// [`crate::sdk::create_fee_outputs`]).
#[must_use]
pub fn pick_fee_inputs(wallet: &[Utxo]) -> Vec<Utxo> {
    wallet
        .iter()
        .filter(|utxo| utxo.output.value.is_lovelace_only())
        .cloned()
        .collect()
}

/// The single wallet output with the largest balance of `asset`; ties broken
/// arbitrarily.
///
/// # Errors
/// Returns [`SelectionError::InsufficientBalance`] if no output holds the
/// asset at all.
pub fn pick_largest_token_output(
    wallet: &[Utxo],
    asset: &AssetId,
) -> Result<Utxo, SelectionError> {
    wallet
        .iter()
        .filter(|utxo| utxo.asset(asset) > 0)
        .max_by_key(|utxo| utxo.asset(asset))
        .cloned()
        .ok_or_else(|| SelectionError::InsufficientBalance {
            asset: asset.clone(),
        })
}

/// Check a requested transfer fits in the selected single output. Inputs are
/// never coalesced implicitly; merge first when this fails.
///
/// # Errors
/// Returns [`SelectionError::AmountTooSmall`] when `requested` exceeds the
/// output's balance of `asset`.
pub fn ensure_transferable(
    utxo: &Utxo,
    asset: &AssetId,
    requested: u64,
) -> Result<(), SelectionError> {
    let available = utxo.asset(asset);
    if requested > available {
        return Err(SelectionError::AmountTooSmall {
            requested,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptoken_ledger::{Address, AssetName, KeyHash, OutPoint, PolicyId, TxHash, TxOut, Value};

    fn asset() -> AssetId {
        AssetId::new(PolicyId::new([1; 28]), AssetName::from_text("X"))
    }

    fn utxo(tag: u8, value: Value) -> Utxo {
        Utxo::new(
            OutPoint::new(TxHash::new([tag; 32]), 0),
            TxOut::new(Address::key(KeyHash::new([9; 28])), value),
        )
    }

    #[test]
    fn fee_inputs_exclude_token_outputs() {
        let wallet = vec![
            utxo(1, Value::from_lovelace(20_000_000)),
            utxo(2, Value::from_lovelace(2_000_000).with_asset(asset(), 5)),
            utxo(3, Value::from_lovelace(20_000_000)),
        ];
        let fee_inputs = pick_fee_inputs(&wallet);
        assert_eq!(fee_inputs.len(), 2);
        assert!(fee_inputs.iter().all(|u| u.output.value.is_lovelace_only()));
    }

    #[test]
    fn largest_token_output_wins() -> anyhow::Result<()> {
        let wallet = vec![
            utxo(1, Value::from_lovelace(1).with_asset(asset(), 100)),
            utxo(2, Value::from_lovelace(1).with_asset(asset(), 700)),
            utxo(3, Value::from_lovelace(1).with_asset(asset(), 200)),
        ];
        let picked = pick_largest_token_output(&wallet, &asset())?;
        assert_eq!(picked.asset(&asset()), 700);
        Ok(())
    }

    #[test]
    fn missing_asset_is_insufficient_balance() {
        let wallet = vec![utxo(1, Value::from_lovelace(5))];
        let err = pick_largest_token_output(&wallet, &asset()).expect_err("must fail");
        assert!(matches!(err, SelectionError::InsufficientBalance { .. }));
    }

    #[test]
    fn oversized_request_is_amount_too_small() {
        let holding = utxo(1, Value::from_lovelace(1).with_asset(asset(), 300));
        let err = ensure_transferable(&holding, &asset(), 400).expect_err("must fail");
        assert!(matches!(
            err,
            SelectionError::AmountTooSmall {
                requested: 400,
                available: 300
            }
        ));
        assert!(ensure_transferable(&holding, &asset(), 300).is_ok());
    }
}
