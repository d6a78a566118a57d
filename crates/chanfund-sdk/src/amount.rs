//! Conversion between the wallet service's decimal coin values and satoshis.
//!
//! The service reports balances and fees as JSON numbers in whole coins.
//! Internally every amount is an integral [`Amount`].

use bitcoincore_rpc::bitcoin::Amount;
use bitcoincore_rpc::bitcoin::amount::Denomination;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Convert a decimal whole-coin value into satoshis, rounding to the
/// nearest satoshi.
///
/// Formatting with eight fractional digits rounds the binary value to the
/// decimal it was parsed from for every amount up to the supply cap, so the
/// result is exact for anything the service can report.
pub fn coins_to_amount(coins: f64) -> Result<Amount> {
    if !coins.is_finite() || coins < 0.0 {
        return Err(Error::Amount(format!("{coins} is not a valid coin amount")));
    }
    let decimal = format!("{:.8}", coins.abs());
    let amount = Amount::from_str_in(&decimal, Denomination::Bitcoin)
        .map_err(|e| Error::Amount(format!("{decimal}: {e}")))?;
    if amount > Amount::MAX_MONEY {
        return Err(Error::Amount(format!("{decimal} exceeds the coin supply")));
    }
    Ok(amount)
}

/// Serde adapter for RPC fields carrying decimal coin values.
pub(crate) fn deserialize_coins<'de, D>(deserializer: D) -> std::result::Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let coins = f64::deserialize(deserializer)?;
    coins_to_amount(coins).map_err(serde::de::Error::custom)
}
