// blockchain-core/src/coin.rs

use crate::{Amount, BlockchainError, BlockchainResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A single-denomination token amount
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Amount) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, Amount::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Multi-denomination amount.
///
/// Always normalized: sorted by denom, one entry per denom, no zero entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn new(coins: Vec<Coin>) -> Self {
        let mut normalized: Vec<Coin> = Vec::with_capacity(coins.len());
        let mut sorted = coins;
        sorted.sort_by(|a, b| a.denom.cmp(&b.denom));

        for coin in sorted {
            match normalized.last_mut() {
                Some(last) if last.denom == coin.denom => {
                    last.amount = last.amount.clone() + coin.amount;
                }
                _ => normalized.push(coin),
            }
        }

        normalized.retain(|c| !c.is_zero());
        Self(normalized)
    }

    pub fn from_coin(coin: Coin) -> Self {
        Self::new(vec![coin])
    }

    /// Amount held in `denom`, zero when absent
    pub fn amount_of(&self, denom: &str) -> Amount {
        self.0
            .binary_search_by(|c| c.denom.as_str().cmp(denom))
            .map(|idx| self.0[idx].amount.clone())
            .unwrap_or_else(|_| Amount::zero())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Coins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let coins = Vec::<Coin>::deserialize(deserializer)?;
        Ok(Coins::new(coins))
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Denominations are 2-64 chars, lowercase alphanumeric, starting with a letter
pub fn validate_denom(denom: &str) -> BlockchainResult<()> {
    let valid_len = (2..=64).contains(&denom.len());
    let starts_alpha = denom.chars().next().map_or(false, |c| c.is_ascii_lowercase());
    let charset = denom
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());

    if valid_len && starts_alpha && charset {
        Ok(())
    } else {
        Err(BlockchainError::InvalidDenom(denom.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coins_normalization() {
        let coins = Coins::new(vec![
            Coin::new("zeta", Amount::from_u64(5)),
            Coin::new("uclr", Amount::from_u64(10)),
            Coin::new("uclr", Amount::from_u64(15)),
            Coin::new("atom", Amount::zero()),
        ]);

        assert_eq!(coins.len(), 2);
        assert_eq!(coins.amount_of("uclr"), Amount::from_u64(25));
        assert_eq!(coins.amount_of("zeta"), Amount::from_u64(5));
        assert_eq!(coins.amount_of("atom"), Amount::zero());
        assert_eq!(coins.to_string(), "25uclr,5zeta");
    }

    #[test]
    fn test_coins_json_normalizes_on_read() {
        let json = r#"[{"denom":"uclr","amount":"7"},{"denom":"abc","amount":"3"},{"denom":"uclr","amount":"1"}]"#;
        let coins: Coins = serde_json::from_str(json).unwrap();

        assert_eq!(coins.amount_of("uclr"), Amount::from_u64(8));
        assert_eq!(
            serde_json::to_string(&coins).unwrap(),
            r#"[{"denom":"abc","amount":"3"},{"denom":"uclr","amount":"8"}]"#
        );
    }

    #[test]
    fn test_validate_denom() {
        assert!(validate_denom("uclr").is_ok());
        assert!(validate_denom("ibc2").is_ok());
        assert!(validate_denom("u").is_err());
        assert!(validate_denom("1uclr").is_err());
        assert!(validate_denom("UCLR").is_err());
    }
}
