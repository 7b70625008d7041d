// node/src/runtime.rs
use crate::config::GenesisConfig;
use blockchain_core::{Amount, BlockContext, BlockNumber, Coin, Timestamp};
use governance::{
    CycleOutcome, EligibilityDetails, FundingCycle, FundingCycleManager, FundingParams,
    GovernanceError, GovernanceGenesis, GovernanceResult, ProposalEligibility,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storage::{get_json, set_json, KvStore, StagedStore};
use tokenomics::{Decay, MintParams, Minter, MintingController};

/// Store key of the executor's own bookkeeping
pub const HARNESS_STATE_KEY: &str = "harness_state";

/// Last executed block and the treasury balance the simulator tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessState {
    pub height: BlockNumber,
    pub time: Timestamp,
    pub treasury_balance: Decimal,
    pub total_minted: Amount,
}

/// Module state in genesis form, for restarting a chain from an export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedState {
    pub height: BlockNumber,
    pub time: Timestamp,
    pub treasury_balance: Decimal,
    pub governance: GovernanceGenesis,
    pub minter: Minter,
}

/// Submission turned away while delivering a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSubmission {
    pub proposal_id: u64,
    pub reason: String,
}

/// What happened in one block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockReport {
    pub height: BlockNumber,
    pub provision: Coin,
    pub decayed: Option<Decay>,
    pub accepted: usize,
    pub rejected: Vec<RejectedSubmission>,
    pub cycle: CycleOutcome,
}

/// Drives the modules once per block over a single store.
///
/// Stands in for the real block-execution harness: begin-block minting, then
/// end-block cycle processing and the decay step at each rollover, one block
/// at a time.
pub struct Node<S: KvStore> {
    store: S,
    funding: FundingCycleManager,
    minting: MintingController,
    state: Option<HarnessState>,
}

impl<S: KvStore> Node<S> {
    pub fn new(store: S, funding: FundingParams, mint: MintParams) -> anyhow::Result<Self> {
        let funding = FundingCycleManager::new(funding)?;
        let minting = MintingController::new(mint)?;
        let state: Option<HarnessState> = get_json(&store, HARNESS_STATE_KEY)?;

        if let Some(state) = &state {
            tracing::info!("Resuming after block {} at {}", state.height, state.time);
        }

        Ok(Self {
            store,
            funding,
            minting,
            state,
        })
    }

    /// Whether genesis has already been written to the store
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Write genesis state for every module
    pub fn init_genesis(&mut self, genesis: &GenesisConfig) -> anyhow::Result<()> {
        if self.is_initialized() {
            anyhow::bail!("store already holds chain state");
        }

        let gov_genesis = self.funding.default_genesis(genesis.genesis_time);
        self.funding.init_genesis(&mut self.store, &gov_genesis)?;
        self.minting.init_genesis(&mut self.store, &genesis.minter)?;

        let state = HarnessState {
            height: 0,
            time: genesis.genesis_time,
            treasury_balance: genesis.treasury_balance,
            total_minted: Amount::zero(),
        };
        set_json(&mut self.store, HARNESS_STATE_KEY, &state)?;
        self.state = Some(state);

        tracing::info!("Genesis initialized at {}", genesis.genesis_time);
        Ok(())
    }

    fn state(&self) -> anyhow::Result<&HarnessState> {
        self.state
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("genesis not initialized"))
    }

    pub fn height(&self) -> anyhow::Result<BlockNumber> {
        Ok(self.state()?.height)
    }

    pub fn last_block_time(&self) -> anyhow::Result<Timestamp> {
        Ok(self.state()?.time)
    }

    pub fn treasury_balance(&self) -> anyhow::Result<Decimal> {
        Ok(self.state()?.treasury_balance)
    }

    pub fn total_minted(&self) -> anyhow::Result<Amount> {
        Ok(self.state()?.total_minted.clone())
    }

    /// Deliver a proposal's eligibility details as a transaction at `now`
    pub fn submit_eligibility(&mut self, now: Timestamp, details: EligibilityDetails) -> GovernanceResult<()> {
        self.funding.submit_eligibility(&mut self.store, now, details)
    }

    /// Execute the block at `ctx` carrying `submissions`.
    ///
    /// Mints, delivers the submissions, then runs cycle processing. When the
    /// cycle rolls over the weekly provisions decay one step. Heights must
    /// follow the last executed block and times must not go backwards.
    ///
    /// A rejected submission does not fail the block; only store failures or
    /// a missing cycle do. Writes are buffered and committed together, so a
    /// failed block leaves the store as it was.
    pub fn execute_block(
        &mut self,
        ctx: BlockContext,
        submissions: Vec<EligibilityDetails>,
    ) -> anyhow::Result<BlockReport> {
        let prev = self.state()?.clone();
        if ctx.height != prev.height + 1 {
            anyhow::bail!("expected block {}, got {}", prev.height + 1, ctx.height);
        }
        if ctx.time < prev.time {
            anyhow::bail!("block {} time {} precedes {}", ctx.height, ctx.time, prev.time);
        }

        let mut staged = StagedStore::new(&mut self.store);
        let provision = self.minting.begin_block(&staged, &ctx)?;

        let mut accepted = 0;
        let mut rejected = Vec::new();
        for details in submissions {
            let proposal_id = details.proposal_id;
            match self.funding.submit_eligibility(&mut staged, ctx.time, details) {
                Ok(()) => accepted += 1,
                Err(GovernanceError::Storage(e)) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Block {}: proposal {} rejected: {}", ctx.height, proposal_id, e);
                    rejected.push(RejectedSubmission {
                        proposal_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let cycle = self
            .funding
            .end_block(&mut staged, &ctx, prev.treasury_balance)?;

        let mut treasury_balance = prev.treasury_balance;
        let mut decayed = None;
        if let CycleOutcome::Advanced { admission, .. } = &cycle {
            // the ledger debits admitted funds from the treasury
            let spent = admission.admitted_total.to_decimal().unwrap_or(Decimal::MAX);
            treasury_balance = (treasury_balance - spent).max(Decimal::ZERO);
            decayed = Some(self.minting.decay(&mut staged, &ctx)?);
        }

        let state = HarnessState {
            height: ctx.height,
            time: ctx.time,
            treasury_balance,
            total_minted: prev.total_minted.clone() + provision.amount.clone(),
        };
        set_json(&mut staged, HARNESS_STATE_KEY, &state)?;
        staged.commit()?;
        self.state = Some(state);

        Ok(BlockReport {
            height: ctx.height,
            provision,
            decayed,
            accepted,
            rejected,
            cycle,
        })
    }

    pub fn current_cycle(&self) -> anyhow::Result<Option<FundingCycle>> {
        Ok(self.funding.get_current_cycle(&self.store)?)
    }

    pub fn check_cycle_active(&self, now: Timestamp) -> bool {
        self.funding.check_cycle_active(&self.store, now)
    }

    pub fn minter(&self) -> anyhow::Result<Minter> {
        Ok(self.minting.get_minter(&self.store)?)
    }

    pub fn block_provision(&self) -> anyhow::Result<Coin> {
        Ok(self.minting.block_provision(&self.store)?)
    }

    pub fn next_weekly_supply(&self) -> anyhow::Result<Decimal> {
        Ok(self.minting.next_weekly_supply(&self.store)?)
    }

    pub fn cycle_results(&self, cycle_id: u64) -> anyhow::Result<Option<Vec<ProposalEligibility>>> {
        Ok(self.funding.cycle_results(&self.store, cycle_id)?)
    }

    pub fn projected_eligibility(&self) -> anyhow::Result<Vec<ProposalEligibility>> {
        let treasury = self.treasury_balance()?;
        Ok(self.funding.projected_eligibility(&self.store, treasury)?)
    }

    pub fn export_state(&self) -> anyhow::Result<ExportedState> {
        let state = self.state()?;
        Ok(ExportedState {
            height: state.height,
            time: state.time,
            treasury_balance: state.treasury_balance,
            governance: self.funding.export_genesis(&self.store)?,
            minter: self.minting.get_minter(&self.store)?,
        })
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeConfig;
    use blockchain_core::Coins;
    use chrono::Duration;
    use governance::keys::CURRENT_CYCLE_KEY;
    use std::cell::Cell;
    use storage::{Batch, MemoryStore, StorageError, StorageResult};

    /// Memory store that can fail reads of the current cycle or any write
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        cycle_reads_left: Cell<Option<usize>>,
        fail_writes: bool,
    }

    impl FlakyStore {
        fn check_write(&self) -> StorageResult<()> {
            if self.fail_writes {
                return Err(StorageError::DatabaseError("write rejected".into()));
            }
            Ok(())
        }
    }

    impl KvStore for FlakyStore {
        fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
            if key == CURRENT_CYCLE_KEY.as_bytes() {
                match self.cycle_reads_left.get() {
                    Some(0) => return Err(StorageError::DatabaseError("read failed".into())),
                    Some(n) => self.cycle_reads_left.set(Some(n - 1)),
                    None => {}
                }
            }
            self.inner.get(key)
        }

        fn set(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
            self.check_write()?;
            self.inner.set(key, value)
        }

        fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
            self.check_write()?;
            self.inner.delete(key)
        }

        fn write_batch(&mut self, batch: Batch) -> StorageResult<()> {
            self.check_write()?;
            self.inner.write_batch(batch)
        }
    }

    fn flaky_node() -> (Node<FlakyStore>, NodeConfig) {
        let config = NodeConfig::default();
        let mut node = Node::new(FlakyStore::default(), config.funding.clone(), config.mint.clone()).unwrap();
        node.init_genesis(&config.genesis).unwrap();
        (node, config)
    }

    fn new_node() -> (Node<MemoryStore>, NodeConfig) {
        let config = NodeConfig::default();
        let mut node = Node::new(MemoryStore::new(), config.funding.clone(), config.mint.clone()).unwrap();
        node.init_genesis(&config.genesis).unwrap();
        (node, config)
    }

    #[test]
    fn test_genesis_only_once() {
        let (mut node, config) = new_node();
        assert!(node.init_genesis(&config.genesis).is_err());
        assert_eq!(node.height().unwrap(), 0);
    }

    #[test]
    fn test_block_sequence_enforced() {
        let (mut node, config) = new_node();
        let t = config.genesis.genesis_time;

        assert!(node.execute_block(BlockContext::new(2, t), vec![]).is_err());
        node.execute_block(BlockContext::new(1, t + Duration::seconds(5)), vec![]).unwrap();
        assert!(node.execute_block(BlockContext::new(2, t), vec![]).is_err());
    }

    #[test]
    fn test_execute_block_mints() {
        let (mut node, config) = new_node();
        let t = config.genesis.genesis_time;

        let report = node.execute_block(BlockContext::new(1, t + Duration::seconds(5)), vec![]).unwrap();
        assert_eq!(report.provision.amount, Amount::from_u64(2_480_158));
        assert!(matches!(report.cycle, CycleOutcome::Continued(_)));
        assert!(report.decayed.is_none());
        assert_eq!(node.total_minted().unwrap(), Amount::from_u64(2_480_158));
    }

    #[test]
    fn test_rollover_debits_treasury() {
        let (mut node, config) = new_node();
        let t = config.genesis.genesis_time;

        let details = EligibilityDetails::new(
            1,
            Amount::from_u64(10),
            Coins::from_coin(Coin::new("uclr", Amount::from_u64(400_000_000))),
        );
        node.submit_eligibility(t + Duration::days(1), details).unwrap();

        let report = node
            .execute_block(BlockContext::new(1, t + Duration::weeks(4) + Duration::seconds(1)), vec![])
            .unwrap();

        assert!(matches!(report.cycle, CycleOutcome::Advanced { .. }));
        assert_eq!(report.provision.amount, Amount::from_u64(2_480_158));
        assert_eq!(
            report.decayed.as_ref().map(|d| d.current),
            Some(Decimal::from(285_000_000_000u64))
        );
        assert_eq!(node.cycle_results(1).unwrap().unwrap().len(), 1);
        assert_eq!(
            node.treasury_balance().unwrap(),
            Decimal::from(10_000_000_000u64 - 400_000_000)
        );
        assert_eq!(node.current_cycle().unwrap().unwrap().cycle_id, 2);

        let exported = node.export_state().unwrap();
        assert_eq!(exported.governance.current_cycle.cycle_id, 2);
        assert!(exported.governance.eligibility_list.is_empty());
    }

    #[test]
    fn test_rejected_submission_does_not_fail_block() {
        let (mut node, config) = new_node();
        let t = config.genesis.genesis_time;
        let details = |id| EligibilityDetails::new(id, Amount::from_u64(1), Coins::empty());

        let report = node
            .execute_block(BlockContext::new(1, t + Duration::days(1)), vec![details(1), details(1)])
            .unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].proposal_id, 1);

        // inside the freeze window
        let report = node
            .execute_block(BlockContext::new(2, t + Duration::days(27)), vec![details(2)])
            .unwrap();
        assert_eq!(report.accepted, 0);
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn test_failed_block_leaves_store_untouched() {
        let (mut node, config) = flaky_node();
        let t = config.genesis.genesis_time;
        let details = EligibilityDetails::new(1, Amount::from_u64(5), Coins::empty());

        // the submission reads the cycle, then cycle processing fails
        node.store.cycle_reads_left.set(Some(1));
        let ctx = BlockContext::new(1, t + Duration::days(1));
        assert!(node.execute_block(ctx, vec![details.clone()]).is_err());

        node.store.cycle_reads_left.set(None);
        assert_eq!(node.height().unwrap(), 0);
        assert!(node.export_state().unwrap().governance.eligibility_list.is_empty());

        // retrying the same height is not a duplicate
        let report = node.execute_block(ctx, vec![details]).unwrap();
        assert_eq!(report.accepted, 1);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn test_failed_rollover_does_not_decay() {
        let (mut node, config) = flaky_node();
        let t = config.genesis.genesis_time;
        let ctx = BlockContext::new(1, t + Duration::weeks(4));

        node.store.fail_writes = true;
        assert!(node.execute_block(ctx, vec![]).is_err());
        node.store.fail_writes = false;

        assert_eq!(node.height().unwrap(), 0);
        assert_eq!(node.minter().unwrap().weekly_provisions, Decimal::from(300_000_000_000u64));
        assert_eq!(node.current_cycle().unwrap().unwrap().cycle_id, 1);

        let report = node.execute_block(ctx, vec![]).unwrap();
        assert!(matches!(report.cycle, CycleOutcome::Advanced { .. }));
        assert!(report.decayed.is_some());
        assert_eq!(node.minter().unwrap().weekly_provisions, Decimal::from(285_000_000_000u64));
    }

    #[test]
    fn test_resume_from_store() {
        let (mut node, config) = new_node();
        let t = config.genesis.genesis_time;
        node.execute_block(BlockContext::new(1, t + Duration::seconds(5)), vec![]).unwrap();

        let store = node.into_store();
        let resumed = Node::new(store, config.funding.clone(), config.mint.clone()).unwrap();
        assert!(resumed.is_initialized());
        assert_eq!(resumed.height().unwrap(), 1);
    }
}
