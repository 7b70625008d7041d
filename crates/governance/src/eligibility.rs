// governance/src/eligibility.rs

use blockchain_core::{Coins, VoteCount};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Support and funding request of one proposal for the current cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityDetails {
    /// ID of the proposal
    pub proposal_id: u64,
    /// Finalized vote tally
    pub votes_count: VoteCount,
    /// Funds the proposal asks for
    pub requested_fund: Coins,
}

impl EligibilityDetails {
    pub fn new(proposal_id: u64, votes_count: VoteCount, requested_fund: Coins) -> Self {
        Self {
            proposal_id,
            votes_count,
            requested_fund,
        }
    }
}

/// Position of a proposal after ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalEligibility {
    /// ID of the proposal
    pub proposal_id: u64,
    /// 1-based rank
    pub rank: u64,
    /// Whether the proposal fits the cycle budget
    pub expected: bool,
}

/// Total order used for ranking: most votes first, then lowest proposal id
pub fn ranking_order(a: &EligibilityDetails, b: &EligibilityDetails) -> Ordering {
    b.votes_count
        .cmp(&a.votes_count)
        .then_with(|| a.proposal_id.cmp(&b.proposal_id))
}

/// Order proposals by support.
///
/// Ties on `votes_count` resolve by `proposal_id` ascending, so the result
/// does not depend on input order.
pub fn rank(mut details: Vec<EligibilityDetails>) -> Vec<EligibilityDetails> {
    details.sort_by(ranking_order);
    details
}
