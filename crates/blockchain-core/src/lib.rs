// blockchain-core/src/lib.rs

//! Core ledger primitives shared by the state-transition modules
//!
//! This crate provides:
//! - Arbitrary-precision token amounts
//! - Multi-denomination coin sets
//! - The per-block execution context

pub mod coin;
pub mod types;

pub use coin::{validate_denom, Coin, Coins};
pub use types::*;

/// Result type for blockchain operations
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Errors that can occur in blockchain operations
#[derive(Debug, thiserror::Error)]
pub enum BlockchainError {
    #[error("Invalid denomination: {0}")]
    InvalidDenom(String),
}
