// governance/src/cycle.rs

use crate::{FundingParams, GovernanceError, GovernanceResult};
use blockchain_core::Timestamp;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ID given to the cycle opened at genesis
pub const GENESIS_CYCLE_ID: u64 = 1;

/// Where a block time falls relative to the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleState {
    /// Before the first cycle starts (only with a first-cycle delay)
    Pending,
    /// Proposals are admitted
    Active,
    /// Inside the freeze window, admissions blocked
    Frozen,
    /// Past the end, the cycle must roll over
    Expired,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleState::Pending => "pending",
            CycleState::Active => "active",
            CycleState::Frozen => "frozen",
            CycleState::Expired => "expired",
        };
        write!(f, "{}", name)
    }
}

/// Funding cycle controlling proposal admission windows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingCycle {
    /// ID of the cycle
    pub cycle_id: u64,
    /// Time the cycle starts
    pub cycle_start_time: Timestamp,
    /// Time the cycle ends
    pub cycle_end_time: Timestamp,
}

impl FundingCycle {
    pub fn new(cycle_id: u64, cycle_start_time: Timestamp, period: Duration) -> Self {
        Self {
            cycle_id,
            cycle_start_time,
            cycle_end_time: cycle_start_time + period,
        }
    }

    /// First cycle, starting after the configured delay
    pub fn genesis(genesis_time: Timestamp, params: &FundingParams) -> Self {
        Self::new(
            GENESIS_CYCLE_ID,
            genesis_time + params.first_cycle_delay(),
            params.period(),
        )
    }

    pub fn duration(&self) -> Duration {
        self.cycle_end_time - self.cycle_start_time
    }

    /// Start of the freeze window
    pub fn freeze_start(&self, params: &FundingParams) -> Timestamp {
        self.cycle_end_time - params.freeze_window()
    }

    /// A stored cycle must span exactly one configured period
    pub fn check_duration(&self, params: &FundingParams) -> GovernanceResult<()> {
        let actual = self.duration();
        if actual != params.period() {
            return Err(GovernanceError::InvalidCycleDuration {
                expected_secs: params.period_secs,
                actual_secs: actual.num_seconds(),
            });
        }
        Ok(())
    }

    /// Whether `now` is past the end of this cycle
    pub fn has_ended(&self, now: Timestamp, params: &FundingParams) -> bool {
        params.boundary.reached(now, self.cycle_end_time)
    }

    /// Classify `now` against this cycle
    pub fn state_at(&self, now: Timestamp, params: &FundingParams) -> GovernanceResult<CycleState> {
        self.check_duration(params)?;

        let state = if now < self.cycle_start_time {
            CycleState::Pending
        } else if self.has_ended(now, params) {
            CycleState::Expired
        } else if params.boundary.reached(now, self.freeze_start(params)) {
            CycleState::Frozen
        } else {
            CycleState::Active
        };

        Ok(state)
    }

    /// The cycle that replaces this one when it expires at `now`
    pub fn next(&self, now: Timestamp, params: &FundingParams) -> FundingCycle {
        FundingCycle::new(self.cycle_id + 1, now, params.period())
    }
}
