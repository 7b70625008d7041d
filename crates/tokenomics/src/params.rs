// tokenomics/src/params.rs

use crate::{TokenomicsError, TokenomicsResult};
use blockchain_core::validate_denom;
use serde::{Deserialize, Serialize};

/// Blocks per week at a 5 second block time
pub const DEFAULT_BLOCKS_PER_WEEK: u64 = 7 * 24 * 60 * 60 / 5;

/// Mint parameters, supplied by genesis configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintParams {
    /// Denomination of newly issued tokens
    pub mint_denom: String,
    /// Expected blocks per week
    pub blocks_per_week: u64,
}

impl Default for MintParams {
    fn default() -> Self {
        Self {
            mint_denom: "uclr".to_string(),
            blocks_per_week: DEFAULT_BLOCKS_PER_WEEK,
        }
    }
}

impl MintParams {
    pub fn validate(&self) -> TokenomicsResult<()> {
        validate_denom(&self.mint_denom)
            .map_err(|e| TokenomicsError::InvalidConfiguration(e.to_string()))?;

        if self.blocks_per_week == 0 {
            return Err(TokenomicsError::InvalidConfiguration(
                "blocks per week must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = MintParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.blocks_per_week, 120_960);
    }

    #[test]
    fn test_invalid_params() {
        let params = MintParams { blocks_per_week: 0, ..Default::default() };
        assert!(params.validate().is_err());

        let params = MintParams { mint_denom: "".into(), ..Default::default() };
        assert!(params.validate().is_err());
    }
}
