// governance/src/params.rs

use crate::{GovernanceError, GovernanceResult};
use blockchain_core::{validate_denom, Timestamp};
use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Seconds in one day
pub const DAY_SECS: i64 = 24 * 60 * 60;

/// Canonical funding cycle length (4 weeks)
pub const DEFAULT_PERIOD_SECS: i64 = 28 * DAY_SECS;

/// Trailing window of a cycle without admissions (2 days)
pub const DEFAULT_FREEZE_WINDOW_SECS: i64 = 2 * DAY_SECS;

pub const DEFAULT_BOND_DENOM: &str = "uclr";

/// Upper bound on the period and the first-cycle delay (100 years)
pub const MAX_PERIOD_SECS: i64 = 100 * 365 * DAY_SECS;

/// How a block time is compared against cycle boundaries.
///
/// Two variants of the boundary check have been deployed; both are kept
/// selectable until the canonical one is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleBoundary {
    /// A boundary is crossed when `now >= boundary`
    #[default]
    Inclusive,
    /// A boundary is crossed only when `now > boundary`
    Exclusive,
}

impl CycleBoundary {
    /// Whether `now` has reached `boundary` under this comparison
    pub fn reached(&self, now: Timestamp, boundary: Timestamp) -> bool {
        match self {
            CycleBoundary::Inclusive => now >= boundary,
            CycleBoundary::Exclusive => now > boundary,
        }
    }
}

/// Funding cycle parameters, supplied by genesis configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingParams {
    /// Length of every funding cycle
    pub period_secs: i64,
    /// Trailing part of the cycle in which no proposals are admitted
    pub freeze_window_secs: i64,
    /// Delay between genesis and the start of the first cycle (0 or 28 days
    /// depending on network)
    pub first_cycle_delay_secs: i64,
    /// Denomination that treasury budgets are counted in
    pub bond_denom: String,
    /// Share of the treasury balance spendable per cycle
    pub treasury_fraction: Decimal,
    pub boundary: CycleBoundary,
}

impl Default for FundingParams {
    fn default() -> Self {
        Self {
            period_secs: DEFAULT_PERIOD_SECS,
            freeze_window_secs: DEFAULT_FREEZE_WINDOW_SECS,
            first_cycle_delay_secs: 0,
            bond_denom: DEFAULT_BOND_DENOM.to_string(),
            treasury_fraction: Decimal::new(10, 2), // 10%
            boundary: CycleBoundary::Inclusive,
        }
    }
}

impl FundingParams {
    pub fn period(&self) -> Duration {
        Duration::seconds(self.period_secs)
    }

    pub fn freeze_window(&self) -> Duration {
        Duration::seconds(self.freeze_window_secs)
    }

    pub fn first_cycle_delay(&self) -> Duration {
        Duration::seconds(self.first_cycle_delay_secs)
    }

    /// Reject parameters that would make cycles degenerate
    pub fn validate(&self) -> GovernanceResult<()> {
        if self.period_secs <= 0 || self.period_secs > MAX_PERIOD_SECS {
            return Err(GovernanceError::InvalidConfiguration(format!(
                "period must be within (0, {}]s, is {}s",
                MAX_PERIOD_SECS, self.period_secs
            )));
        }

        if self.freeze_window_secs < 0 || self.freeze_window_secs >= self.period_secs {
            return Err(GovernanceError::InvalidConfiguration(format!(
                "freeze window {}s must lie within the period {}s",
                self.freeze_window_secs, self.period_secs
            )));
        }

        if self.first_cycle_delay_secs < 0 || self.first_cycle_delay_secs > MAX_PERIOD_SECS {
            return Err(GovernanceError::InvalidConfiguration(format!(
                "first cycle delay must be within [0, {}]s, is {}s",
                MAX_PERIOD_SECS, self.first_cycle_delay_secs
            )));
        }

        if self.treasury_fraction < Decimal::ZERO || self.treasury_fraction > Decimal::ONE {
            return Err(GovernanceError::InvalidConfiguration(format!(
                "treasury fraction must be within [0, 1], is {}",
                self.treasury_fraction
            )));
        }

        validate_denom(&self.bond_denom)
            .map_err(|e| GovernanceError::InvalidConfiguration(e.to_string()))?;

        Ok(())
    }
}
