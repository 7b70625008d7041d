// tokenomics/src/minter.rs

use crate::{MintParams, TokenomicsError, TokenomicsResult};
use blockchain_core::{Amount, Coin};
use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Weekly provisions at chain start
pub const INITIAL_WEEKLY_PROVISIONS: u64 = 300_000_000_000;

/// 5% decay per step
pub const DEFAULT_DEFLATION_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Minting state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minter {
    /// Fraction the weekly provisions shrink by at every decay step
    #[serde(rename = "deflation")]
    pub deflation_rate: Decimal,
    /// Current weekly expected provisions
    pub weekly_provisions: Decimal,
}

impl Minter {
    pub fn new(deflation_rate: Decimal, weekly_provisions: Decimal) -> Self {
        Self {
            deflation_rate,
            weekly_provisions,
        }
    }

    /// Initial minter with the given deflation rate
    pub fn initial(deflation_rate: Decimal) -> Self {
        Self::new(deflation_rate, Decimal::from(INITIAL_WEEKLY_PROVISIONS))
    }

    /// Initial minter for a new chain, decaying 5% per step
    pub fn default_initial() -> Self {
        Self::initial(DEFAULT_DEFLATION_RATE)
    }

    /// Reject a minter that would grow supply or issue negative amounts
    pub fn validate(&self) -> TokenomicsResult<()> {
        if self.deflation_rate < Decimal::ZERO {
            return Err(TokenomicsError::NegativeInflation(self.deflation_rate));
        }

        if self.deflation_rate > Decimal::ONE {
            return Err(TokenomicsError::InvalidConfiguration(format!(
                "deflation rate cannot exceed 1, is {}",
                self.deflation_rate
            )));
        }

        if self.weekly_provisions < Decimal::ZERO {
            return Err(TokenomicsError::InvalidConfiguration(format!(
                "weekly provisions cannot be negative, is {}",
                self.weekly_provisions
            )));
        }

        Ok(())
    }

    /// Weekly provisions after one decay step:
    /// `weekly_provisions - deflation_rate * weekly_provisions`
    pub fn next_weekly_supply(&self) -> TokenomicsResult<Decimal> {
        let reduction = self
            .deflation_rate
            .checked_mul(self.weekly_provisions)
            .ok_or_else(|| TokenomicsError::OverflowError("Deflation step overflow".into()))?;

        self.weekly_provisions
            .checked_sub(reduction)
            .ok_or_else(|| TokenomicsError::OverflowError("Weekly supply underflow".into()))
    }

    /// Apply one decay step in place, returning the previous weekly provisions
    pub fn decay(&mut self) -> TokenomicsResult<Decimal> {
        let next = self.next_weekly_supply()?;
        Ok(std::mem::replace(&mut self.weekly_provisions, next))
    }

    /// Provisions for one block: `floor(weekly_provisions / blocks_per_week)`.
    ///
    /// Computed in integers so that `provision * blocks_per_week` never
    /// exceeds the weekly provisions.
    pub fn block_provision(&self, params: &MintParams) -> TokenomicsResult<Coin> {
        if params.blocks_per_week == 0 {
            return Err(TokenomicsError::InvalidConfiguration(
                "blocks per week must be positive".into(),
            ));
        }

        let weekly = Amount::from_decimal_trunc(self.weekly_provisions).ok_or_else(|| {
            TokenomicsError::InvalidConfiguration(format!(
                "weekly provisions cannot be negative, is {}",
                self.weekly_provisions
            ))
        })?;

        let per_block = weekly.inner() / BigUint::from(params.blocks_per_week);
        Ok(Coin::new(params.mint_denom.clone(), Amount::new(per_block)))
    }

    /// Provisions over 52 weeks at the current rate, before decay
    pub fn annual_provisions(&self) -> TokenomicsResult<Decimal> {
        self.weekly_provisions
            .checked_mul(Decimal::from(52))
            .ok_or_else(|| TokenomicsError::OverflowError("Annual provisions overflow".into()))
    }
}
