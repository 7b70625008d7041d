// node/src/simulation.rs
use crate::runtime::{BlockReport, Node};
use blockchain_core::{Amount, BlockContext, BlockNumber};
use chrono::Duration;
use governance::{CycleOutcome, EligibilityDetails};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use storage::KvStore;

/// Eligibility details delivered in the block at `height`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSubmission {
    pub height: BlockNumber,
    #[serde(flatten)]
    pub details: EligibilityDetails,
}

/// Load submissions from a JSON array
pub fn load_submissions(path: &str) -> anyhow::Result<Vec<ProposalSubmission>> {
    let contents = std::fs::read_to_string(path)?;
    let submissions = serde_json::from_str(&contents)?;
    Ok(submissions)
}

/// One closed funding cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedCycle {
    pub cycle_id: u64,
    pub closed_at: BlockNumber,
    pub funded: Vec<u64>,
    pub skipped: Vec<u64>,
    pub admitted_total: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub first_height: BlockNumber,
    pub last_height: BlockNumber,
    pub minted: Amount,
    pub decay_steps: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub closed_cycles: Vec<ClosedCycle>,
}

impl SimulationSummary {
    fn record(&mut self, report: &BlockReport) {
        if self.first_height == 0 {
            self.first_height = report.height;
        }
        self.last_height = report.height;
        self.minted = self.minted.clone() + report.provision.amount.clone();
        self.accepted += report.accepted;
        self.rejected += report.rejected.len();
        if report.decayed.is_some() {
            self.decay_steps += 1;
        }

        if let CycleOutcome::Advanced { closed, admission, .. } = &report.cycle {
            self.closed_cycles.push(ClosedCycle {
                cycle_id: closed.cycle_id,
                closed_at: report.height,
                funded: admission.admitted().map(|r| r.proposal_id).collect(),
                skipped: admission.skipped().map(|r| r.proposal_id).collect(),
                admitted_total: admission.admitted_total.clone(),
            });
        }
    }
}

/// Execute `blocks` blocks after the node's last block, `block_time` apart,
/// delivering each submission in the block at its height.
///
/// Submissions for heights already executed are dropped with a warning.
pub fn run_simulation<S: KvStore>(
    node: &mut Node<S>,
    blocks: u64,
    block_time: Duration,
    submissions: Vec<ProposalSubmission>,
) -> anyhow::Result<SimulationSummary> {
    if block_time <= Duration::zero() {
        anyhow::bail!("block time must be positive");
    }

    let start = node.height()?;
    let mut time = node.last_block_time()?;

    let mut pending: BTreeMap<BlockNumber, Vec<EligibilityDetails>> = BTreeMap::new();
    for submission in submissions {
        if submission.height <= start {
            tracing::warn!(
                "Dropping proposal {} for past block {}",
                submission.details.proposal_id,
                submission.height
            );
            continue;
        }
        pending.entry(submission.height).or_default().push(submission.details);
    }

    tracing::info!("Simulating blocks {}..={}", start + 1, start + blocks);

    let mut summary = SimulationSummary::default();
    for height in start + 1..=start + blocks {
        time += block_time;
        let txs = pending.remove(&height).unwrap_or_default();
        let report = node.execute_block(BlockContext::new(height, time), txs)?;
        summary.record(&report);
    }

    if !pending.is_empty() {
        tracing::warn!(
            "{} submissions scheduled past block {} were not delivered",
            pending.values().map(Vec::len).sum::<usize>(),
            start + blocks
        );
    }

    tracing::info!(
        "Simulation done: {} minted, {} cycles closed, {} submissions rejected",
        summary.minted,
        summary.closed_cycles.len(),
        summary.rejected
    );

    Ok(summary)
}
