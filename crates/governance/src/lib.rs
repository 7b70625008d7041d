// governance/src/lib.rs

//! Funding-cycle governance
//!
//! Proposals compete for a share of the community treasury once per
//! funding cycle:
//! - Eligibility ranking: deterministic order by vote support
//! - Fund verification: fixed-point budget checks
//! - Funding cycles: timing, freeze window and roll-over
//!
//! Everything here runs inside the replicated state machine. Arithmetic is
//! fixed-point and every ordering is total, so all replicas agree.

pub mod cycle;
pub mod eligibility;
pub mod keys;
pub mod manager;
pub mod params;
pub mod verifier;

pub use cycle::{CycleState, FundingCycle};
pub use eligibility::{rank, EligibilityDetails, ProposalEligibility};
pub use manager::{CycleOutcome, FundingCycleManager, GovernanceGenesis};
pub use params::{CycleBoundary, FundingParams};
pub use verifier::{admit_ranked, exceeds_limit, over_limit, percentage_of, Admission};

use blockchain_core::Amount;
use storage::StorageError;

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Errors that can occur in governance operations
#[derive(Debug, thiserror::Error)]
pub enum GovernanceError {
    #[error("No current funding cycle in store")]
    CycleNotFound,

    #[error("Funding cycle spans {actual_secs}s, expected {expected_secs}s")]
    InvalidCycleDuration { expected_secs: i64, actual_secs: i64 },

    #[error("Proposal {proposal_id} requests {requested}, remaining budget {remaining}")]
    InsufficientTreasury {
        proposal_id: u64,
        requested: Amount,
        remaining: Amount,
    },

    #[error("Funding admissions closed: cycle is {0}")]
    FundingClosed(CycleState),

    #[error("Proposal {0} already registered for this cycle")]
    DuplicateProposal(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
