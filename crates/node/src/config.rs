// node/src/config.rs
use blockchain_core::Timestamp;
use chrono::{DateTime, Utc};
use governance::FundingParams;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokenomics::{MintParams, Minter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub data_dir: String,
    pub storage: StorageConfig,
    pub genesis: GenesisConfig,
    pub funding: FundingParams,
    pub mint: MintParams,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    Rocksdb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub max_open_files: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub genesis_time: Timestamp,
    /// Community treasury balance in the bond denom at genesis
    pub treasury_balance: Decimal,
    pub minter: Minter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub block_time_secs: i64,
    pub blocks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposals_file: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".into(),
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                max_open_files: 1024,
            },
            genesis: GenesisConfig {
                // 2024-01-01T00:00:00Z
                genesis_time: DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default(),
                treasury_balance: Decimal::from(10_000_000_000u64),
                minter: Minter::default_initial(),
            },
            funding: FundingParams::default(),
            mint: MintParams::default(),
            simulation: SimulationConfig {
                block_time_secs: 5,
                blocks: 1_000,
                proposals_file: None,
            },
        }
    }
}

impl NodeConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: NodeConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Checks run before anything touches the store
    pub fn validate(&self) -> anyhow::Result<()> {
        self.funding.validate()?;
        self.mint.validate()?;
        self.genesis.minter.validate()?;

        if self.simulation.block_time_secs <= 0 {
            anyhow::bail!(
                "block time must be positive, is {}s",
                self.simulation.block_time_secs
            );
        }

        if self.genesis.treasury_balance < Decimal::ZERO {
            anyhow::bail!(
                "treasury balance cannot be negative, is {}",
                self.genesis.treasury_balance
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> String {
        format!("{}/db", self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(NodeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let config = NodeConfig::default();
        config.to_file(path).unwrap();

        let loaded = NodeConfig::from_file(path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_negative_deflation_rejected() {
        let mut config = NodeConfig::default();
        config.genesis.minter.deflation_rate = Decimal::new(-1, 2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_block_time_rejected() {
        let mut config = NodeConfig::default();
        config.simulation.block_time_secs = 0;
        assert!(config.validate().is_err());
    }
}
