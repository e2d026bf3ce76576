//! Validation and canonicalization of VM coin amounts.

use crate::error::EncodeError;
use vmgate_types::{
    coin::{is_valid_denom, parse_amount, Coin, Coins, MAX_AMOUNT_DIGITS},
    vm,
};

/// Converts a VM coin into a validated host coin.
pub fn normalize_coin(coin: &vm::Coin) -> Result<Coin, EncodeError> {
    let amount = parse_amount(&coin.amount).ok_or_else(|| EncodeError::AmountParse {
        amount: coin.amount.clone(),
        denom: coin.denom.clone(),
    })?;
    if !is_valid_denom(&coin.denom) {
        return Err(EncodeError::InvalidDenom {
            denom: coin.denom.clone(),
        });
    }
    Ok(Coin::new(coin.denom.clone(), amount))
}

/// Converts a VM coin list into canonical form: duplicate denoms are summed, zero
/// totals are dropped and the result is sorted by denom.
pub fn normalize_coins(coins: &[vm::Coin]) -> Result<Coins, EncodeError> {
    let mut normalized = Coins::new();
    for coin in coins {
        let coin = normalize_coin(coin)?;
        if !coin.is_zero() {
            normalized.add(coin);
        }
    }
    // Sums must still fit the host encoding.
    for coin in normalized.iter() {
        let amount = coin.amount.to_string();
        if amount.len() > MAX_AMOUNT_DIGITS {
            return Err(EncodeError::AmountParse {
                amount,
                denom: coin.denom.clone(),
            });
        }
    }
    Ok(normalized)
}
