// governance/src/verifier.rs

use crate::{eligibility::ProposalEligibility, EligibilityDetails, GovernanceError};
use blockchain_core::{Amount, Coins};
use rust_decimal::Decimal;

/// True when `limit <= requested`, i.e. the request can NOT be afforded
fn limit_reached(requested: &Amount, limit: &Amount) -> bool {
    limit <= requested
}

/// Whether the `bond_denom` part of `total_requested` meets or exceeds `limit`.
///
/// Returns `true` when the request is **not** affordable. The fractional part
/// of `limit` is dropped and a negative limit counts as zero.
pub fn exceeds_limit(total_requested: &Coins, limit: Decimal, bond_denom: &str) -> bool {
    let requested = total_requested.amount_of(bond_denom);
    let limit = Amount::from_decimal_trunc(limit).unwrap_or_else(Amount::zero);
    limit_reached(&requested, &limit)
}

/// Compatibility name for [`exceeds_limit`], same polarity
pub fn over_limit(total_requested: &Coins, limit: Decimal, bond_denom: &str) -> bool {
    exceeds_limit(total_requested, limit, bond_denom)
}

/// `amount * fraction` truncated toward zero, `None` on overflow
pub fn percentage_of(amount: Decimal, fraction: Decimal) -> Option<Decimal> {
    amount.checked_mul(fraction).map(|v| v.trunc())
}

/// Outcome of admitting a ranked list against a budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// One entry per ranked proposal, in rank order
    pub results: Vec<ProposalEligibility>,
    /// Sum of admitted requests in the bond denom
    pub admitted_total: Amount,
    /// Budget left after admissions
    pub remaining: Amount,
}

impl Admission {
    pub fn admitted(&self) -> impl Iterator<Item = &ProposalEligibility> {
        self.results.iter().filter(|r| r.expected)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ProposalEligibility> {
        self.results.iter().filter(|r| !r.expected)
    }
}

/// Walk `ranked` in order and admit every proposal whose request stays below
/// the remaining budget.
///
/// Proposals that do not fit are skipped, not fatal; smaller proposals further
/// down may still be admitted.
pub fn admit_ranked(ranked: &[EligibilityDetails], limit: Decimal, bond_denom: &str) -> Admission {
    let budget = Amount::from_decimal_trunc(limit).unwrap_or_else(Amount::zero);
    let mut remaining = budget.clone();
    let mut results = Vec::with_capacity(ranked.len());

    for (idx, details) in ranked.iter().enumerate() {
        let requested = details.requested_fund.amount_of(bond_denom);
        let expected = !limit_reached(&requested, &remaining);

        if expected {
            remaining = remaining - requested;
        } else {
            let skipped = GovernanceError::InsufficientTreasury {
                proposal_id: details.proposal_id,
                requested,
                remaining: remaining.clone(),
            };
            tracing::debug!("Skipping proposal: {}", skipped);
        }

        results.push(ProposalEligibility {
            proposal_id: details.proposal_id,
            rank: idx as u64 + 1,
            expected,
        });
    }

    let admitted_total = budget
        .checked_sub(&remaining)
        .unwrap_or_else(Amount::zero);

    Admission {
        results,
        admitted_total,
        remaining,
    }
}
