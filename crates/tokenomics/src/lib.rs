// tokenomics/src/lib.rs

//! Decaying token issuance
//!
//! This crate implements the minting schedule:
//! - Weekly provisions spread evenly over the blocks of a week
//! - Geometric decay of the weekly provisions once per funding cycle
//!
//! All amounts are fixed-point decimals so every replica computes the same
//! issuance.

pub mod minter;
pub mod minting;
pub mod params;

pub use minter::{Minter, DEFAULT_DEFLATION_RATE, INITIAL_WEEKLY_PROVISIONS};
pub use minting::{Decay, MintingController, MINTER_KEY};
pub use params::MintParams;

use rust_decimal::Decimal;
use storage::StorageError;

/// Result type for tokenomics operations
pub type TokenomicsResult<T> = Result<T, TokenomicsError>;

/// Errors that can occur in tokenomics operations
#[derive(Debug, thiserror::Error)]
pub enum TokenomicsError {
    #[error("Mint deflation rate should be positive, is {0}")]
    NegativeInflation(Decimal),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No minter state in store")]
    MinterNotFound,

    #[error("Overflow error: {0}")]
    OverflowError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
