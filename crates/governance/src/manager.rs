// governance/src/manager.rs

use crate::{
    cycle::{CycleState, FundingCycle},
    eligibility::{rank, EligibilityDetails, ProposalEligibility},
    keys::{eligibility_list_key, eligibility_result_key, CURRENT_CYCLE_KEY},
    params::FundingParams,
    verifier::{admit_ranked, percentage_of, Admission},
    GovernanceError, GovernanceResult,
};
use blockchain_core::{BlockContext, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use storage::{get_json, set_json, Batch, KvStore};

/// Governance state at genesis or export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceGenesis {
    pub current_cycle: FundingCycle,
    /// Details already submitted for the current cycle
    #[serde(default)]
    pub eligibility_list: Vec<EligibilityDetails>,
}

/// What `end_block` did to the current cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Cycle still running
    Continued(CycleState),
    /// Cycle closed, proposals ranked and admitted, next cycle opened
    Advanced {
        closed: FundingCycle,
        opened: FundingCycle,
        admission: Admission,
    },
    /// Stored cycle span disagrees with the configured period; left untouched
    Inconsistent { expected_secs: i64, actual_secs: i64 },
}

/// Owns funding cycle timing and the per-cycle ranking pass.
///
/// Holds only parameters. All state is read from and written to the store
/// passed into each call.
#[derive(Debug, Clone)]
pub struct FundingCycleManager {
    params: FundingParams,
}

impl FundingCycleManager {
    /// Create a manager, rejecting invalid parameters
    pub fn new(params: FundingParams) -> GovernanceResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &FundingParams {
        &self.params
    }

    /// Genesis state with a fresh first cycle
    pub fn default_genesis(&self, genesis_time: Timestamp) -> GovernanceGenesis {
        GovernanceGenesis {
            current_cycle: FundingCycle::genesis(genesis_time, &self.params),
            eligibility_list: Vec::new(),
        }
    }

    /// Validate and persist genesis state. Any failure here halts startup.
    pub fn init_genesis<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        genesis: &GovernanceGenesis,
    ) -> GovernanceResult<()> {
        genesis.current_cycle.check_duration(&self.params)?;

        let mut seen = BTreeSet::new();
        for details in &genesis.eligibility_list {
            if !seen.insert(details.proposal_id) {
                return Err(GovernanceError::DuplicateProposal(details.proposal_id));
            }
        }

        let cycle = &genesis.current_cycle;
        let mut batch = Batch::new();
        batch.set_json(CURRENT_CYCLE_KEY, cycle)?;
        batch.set_json(&eligibility_list_key(cycle.cycle_id), &genesis.eligibility_list)?;
        store.write_batch(batch)?;

        tracing::info!(
            "Funding cycle #{} initialized: {} -> {}",
            cycle.cycle_id,
            cycle.cycle_start_time,
            cycle.cycle_end_time
        );

        Ok(())
    }

    /// Read back the current governance state
    pub fn export_genesis<S: KvStore + ?Sized>(&self, store: &S) -> GovernanceResult<GovernanceGenesis> {
        let current_cycle = self.require_current_cycle(store)?;
        let eligibility_list = self.eligibility_list(store, current_cycle.cycle_id)?;
        Ok(GovernanceGenesis {
            current_cycle,
            eligibility_list,
        })
    }

    /// Current cycle, `None` when the store holds none
    pub fn get_current_cycle<S: KvStore + ?Sized>(&self, store: &S) -> GovernanceResult<Option<FundingCycle>> {
        Ok(get_json(store, CURRENT_CYCLE_KEY)?)
    }

    fn require_current_cycle<S: KvStore + ?Sized>(&self, store: &S) -> GovernanceResult<FundingCycle> {
        self.get_current_cycle(store)?
            .ok_or(GovernanceError::CycleNotFound)
    }

    /// State of the current cycle at `now`
    pub fn cycle_state<S: KvStore + ?Sized>(&self, store: &S, now: Timestamp) -> GovernanceResult<CycleState> {
        self.require_current_cycle(store)?.state_at(now, &self.params)
    }

    /// Whether proposals can still be admitted at `now`.
    ///
    /// False inside the freeze window, after the end, when no cycle exists,
    /// and when the stored cycle fails its consistency check.
    pub fn check_cycle_active<S: KvStore + ?Sized>(&self, store: &S, now: Timestamp) -> bool {
        match self.cycle_state(store, now) {
            Ok(state) => state == CycleState::Active,
            Err(GovernanceError::InvalidCycleDuration { expected_secs, actual_secs }) => {
                tracing::warn!(
                    "Stored funding cycle spans {}s instead of {}s; treating as inactive",
                    actual_secs,
                    expected_secs
                );
                false
            }
            Err(e) => {
                tracing::debug!("Funding cycle unavailable: {}", e);
                false
            }
        }
    }

    /// Details submitted for `cycle_id`, in submission order
    pub fn eligibility_list<S: KvStore + ?Sized>(
        &self,
        store: &S,
        cycle_id: u64,
    ) -> GovernanceResult<Vec<EligibilityDetails>> {
        Ok(get_json(store, &eligibility_list_key(cycle_id))?.unwrap_or_default())
    }

    /// Register a proposal for the current cycle.
    ///
    /// Only accepted while the cycle is active; each proposal once per cycle.
    pub fn submit_eligibility<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        now: Timestamp,
        details: EligibilityDetails,
    ) -> GovernanceResult<()> {
        let cycle = self.require_current_cycle(store)?;

        let state = cycle.state_at(now, &self.params)?;
        if state != CycleState::Active {
            return Err(GovernanceError::FundingClosed(state));
        }

        let key = eligibility_list_key(cycle.cycle_id);
        let mut list = self.eligibility_list(store, cycle.cycle_id)?;
        if list.iter().any(|d| d.proposal_id == details.proposal_id) {
            return Err(GovernanceError::DuplicateProposal(details.proposal_id));
        }

        tracing::debug!(
            "Proposal {} registered for cycle #{} with {} votes",
            details.proposal_id,
            cycle.cycle_id,
            details.votes_count
        );

        list.push(details);
        set_json(store, &key, &list)?;
        Ok(())
    }

    /// Budget for one cycle given the treasury balance
    pub fn cycle_limit(&self, treasury_balance: Decimal) -> Decimal {
        percentage_of(treasury_balance, self.params.treasury_fraction).unwrap_or_else(|| {
            tracing::warn!("Cycle limit overflowed for treasury {}; admitting nothing", treasury_balance);
            Decimal::ZERO
        })
    }

    /// Ranking of the current cycle as it would be settled now
    pub fn projected_eligibility<S: KvStore + ?Sized>(
        &self,
        store: &S,
        treasury_balance: Decimal,
    ) -> GovernanceResult<Vec<ProposalEligibility>> {
        let cycle = self.require_current_cycle(store)?;
        let ranked = rank(self.eligibility_list(store, cycle.cycle_id)?);
        let admission = admit_ranked(&ranked, self.cycle_limit(treasury_balance), &self.params.bond_denom);
        Ok(admission.results)
    }

    /// Settled ranking of a closed cycle
    pub fn cycle_results<S: KvStore + ?Sized>(
        &self,
        store: &S,
        cycle_id: u64,
    ) -> GovernanceResult<Option<Vec<ProposalEligibility>>> {
        Ok(get_json(store, &eligibility_result_key(cycle_id))?)
    }

    /// Roll the cycle over once it has expired.
    ///
    /// Ranks the closed cycle's proposals, admits them against the budget and
    /// opens the next cycle, writing all of it in one batch. A cycle failing the
    /// duration check is logged and left as is.
    pub fn end_block<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        ctx: &BlockContext,
        treasury_balance: Decimal,
    ) -> GovernanceResult<CycleOutcome> {
        let cycle = self.require_current_cycle(store)?;

        let state = match cycle.state_at(ctx.time, &self.params) {
            Ok(state) => state,
            Err(GovernanceError::InvalidCycleDuration { expected_secs, actual_secs }) => {
                tracing::warn!(
                    "Funding cycle #{} spans {}s, expected {}s; not advancing at block {}",
                    cycle.cycle_id,
                    actual_secs,
                    expected_secs,
                    ctx.height
                );
                return Ok(CycleOutcome::Inconsistent { expected_secs, actual_secs });
            }
            Err(e) => return Err(e),
        };

        if state != CycleState::Expired {
            return Ok(CycleOutcome::Continued(state));
        }

        let ranked = rank(self.eligibility_list(store, cycle.cycle_id)?);
        let limit = self.cycle_limit(treasury_balance);
        let admission = admit_ranked(&ranked, limit, &self.params.bond_denom);
        let next = cycle.next(ctx.time, &self.params);

        let mut batch = Batch::new();
        batch.set_json(CURRENT_CYCLE_KEY, &next)?;
        batch.set_json(&eligibility_result_key(cycle.cycle_id), &admission.results)?;
        batch.delete(eligibility_list_key(cycle.cycle_id));
        store.write_batch(batch)?;

        tracing::info!(
            "Funding cycle #{} closed at block {}: {} of {} proposals funded ({} of limit {} {})",
            cycle.cycle_id,
            ctx.height,
            admission.admitted().count(),
            admission.results.len(),
            admission.admitted_total,
            limit,
            self.params.bond_denom
        );
        tracing::info!(
            "Funding cycle #{} opened: {} -> {}",
            next.cycle_id,
            next.cycle_start_time,
            next.cycle_end_time
        );

        Ok(CycleOutcome::Advanced {
            closed: cycle,
            opened: next,
            admission,
        })
    }
}
