// tokenomics/src/minting.rs

use crate::{Minter, MintParams, TokenomicsError, TokenomicsResult};
use blockchain_core::{BlockContext, Coin};
use rust_decimal::Decimal;
use storage::{get_json, set_json, KvStore};

/// Store key of the minter state
pub const MINTER_KEY: &str = "minter_state";

/// One decay step of the weekly provisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decay {
    pub previous: Decimal,
    pub current: Decimal,
}

/// Minting controller driving the store-backed [`Minter`]
#[derive(Debug, Clone)]
pub struct MintingController {
    params: MintParams,
}

impl MintingController {
    /// Create new minting controller
    pub fn new(params: MintParams) -> TokenomicsResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &MintParams {
        &self.params
    }

    /// Validate and persist the genesis minter. A negative deflation rate
    /// halts startup here.
    pub fn init_genesis<S: KvStore + ?Sized>(&self, store: &mut S, minter: &Minter) -> TokenomicsResult<()> {
        minter.validate()?;
        set_json(store, MINTER_KEY, minter)?;

        tracing::info!(
            "Minter initialized: weekly provisions {} {}, deflation {}",
            minter.weekly_provisions,
            self.params.mint_denom,
            minter.deflation_rate
        );
        Ok(())
    }

    /// Current minter
    pub fn get_minter<S: KvStore + ?Sized>(&self, store: &S) -> TokenomicsResult<Minter> {
        get_json(store, MINTER_KEY)?.ok_or(TokenomicsError::MinterNotFound)
    }

    pub fn set_minter<S: KvStore + ?Sized>(&self, store: &mut S, minter: &Minter) -> TokenomicsResult<()> {
        set_json(store, MINTER_KEY, minter)?;
        Ok(())
    }

    /// Provision for the next block at the stored rate
    pub fn block_provision<S: KvStore + ?Sized>(&self, store: &S) -> TokenomicsResult<Coin> {
        self.get_minter(store)?.block_provision(&self.params)
    }

    /// Weekly provisions after the next decay step
    pub fn next_weekly_supply<S: KvStore + ?Sized>(&self, store: &S) -> TokenomicsResult<Decimal> {
        self.get_minter(store)?.next_weekly_supply()
    }

    /// Provision to credit for the block at `ctx`
    pub fn begin_block<S: KvStore + ?Sized>(&self, store: &S, ctx: &BlockContext) -> TokenomicsResult<Coin> {
        let provision = self.block_provision(store)?;
        tracing::debug!("Block {} provision: {}", ctx.height, provision);
        Ok(provision)
    }

    /// Apply one decay step to the stored minter.
    ///
    /// Runs once per funding cycle boundary; blocks after it mint at the new rate.
    pub fn decay<S: KvStore + ?Sized>(&self, store: &mut S, ctx: &BlockContext) -> TokenomicsResult<Decay> {
        let mut minter = self.get_minter(store)?;
        let previous = minter.decay()?;
        self.set_minter(store, &minter)?;

        tracing::info!(
            "Weekly provisions decayed at block {}: {} -> {}",
            ctx.height,
            previous,
            minter.weekly_provisions
        );

        Ok(Decay {
            previous,
            current: minter.weekly_provisions,
        })
    }
}
