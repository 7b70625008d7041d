// node/src/main.rs
use clap::{Parser, Subcommand};
use node::config::StorageBackend;
use node::{simulation, Node, NodeConfig};
use storage::{KvStore, MemoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "funding-node")]
#[command(about = "Treasury funding cycles and token issuance, block by block", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new node
    Init {
        /// Data directory
        #[arg(short, long, default_value = "./data")]
        data_dir: String,
    },

    /// Execute blocks from genesis or the last stored block
    Simulate {
        /// Configuration file path
        #[arg(short, long, default_value = "./config.toml")]
        config: String,

        /// Override the number of blocks to execute
        #[arg(short, long)]
        blocks: Option<u64>,

        /// Override the proposal submissions file
        #[arg(short, long)]
        proposals: Option<String>,
    },

    /// Read module state from the store
    Query {
        /// Configuration file path
        #[arg(short, long, default_value = "./config.toml")]
        config: String,

        #[command(subcommand)]
        command: QueryCommands,
    },
}

#[derive(Subcommand)]
enum QueryCommands {
    /// Current funding cycle and its state
    Cycle,

    /// Minter state and next block provision
    Minter,

    /// Settled ranking of a closed cycle
    Results {
        #[arg(short = 'i', long)]
        cycle_id: u64,
    },

    /// Ranking of the current cycle if it closed now
    Projected,

    /// Module state in genesis form
    Export,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "funding_node={0},node={0},governance={0},tokenomics={0},storage={0}",
                    log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Init { data_dir } => {
            init_node(&data_dir)?;
        }
        Commands::Simulate {
            config,
            blocks,
            proposals,
        } => {
            simulate(&config, blocks, proposals)?;
        }
        Commands::Query { config, command } => {
            handle_query_command(&config, command)?;
        }
    }

    Ok(())
}

fn init_node(data_dir: &str) -> anyhow::Result<()> {
    tracing::info!("Initializing node at {}", data_dir);

    std::fs::create_dir_all(data_dir)?;

    let config = NodeConfig {
        data_dir: data_dir.to_string(),
        ..NodeConfig::default()
    };
    let config_path = format!("{}/config.toml", data_dir);
    config.to_file(&config_path)?;

    tracing::info!("Node initialized successfully at {}", data_dir);
    tracing::info!("Edit {} to configure genesis and parameters", config_path);

    Ok(())
}

fn open_store(config: &NodeConfig) -> anyhow::Result<Box<dyn KvStore>> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Box::new(MemoryStore::new())),
        #[cfg(feature = "rocksdb")]
        StorageBackend::Rocksdb => {
            let db = storage::Database::open(storage::DatabaseConfig {
                path: config.db_path(),
                max_open_files: config.storage.max_open_files,
                ..Default::default()
            })?;
            Ok(Box::new(db))
        }
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::Rocksdb => {
            anyhow::bail!("rocksdb backend requested but this binary was built without the `rocksdb` feature")
        }
    }
}

fn open_node(config: &NodeConfig) -> anyhow::Result<Node<Box<dyn KvStore>>> {
    let store = open_store(config)?;
    Node::new(store, config.funding.clone(), config.mint.clone())
}

fn simulate(config_path: &str, blocks: Option<u64>, proposals: Option<String>) -> anyhow::Result<()> {
    tracing::info!("Loading configuration from {}", config_path);
    let config = NodeConfig::from_file(config_path)?;

    let mut node = open_node(&config)?;
    if !node.is_initialized() {
        node.init_genesis(&config.genesis)?;
    }

    let submissions = match proposals.or_else(|| config.simulation.proposals_file.clone()) {
        Some(path) => {
            tracing::info!("Loading proposal submissions from {}", path);
            simulation::load_submissions(&path)?
        }
        None => Vec::new(),
    };

    let summary = simulation::run_simulation(
        &mut node,
        blocks.unwrap_or(config.simulation.blocks),
        chrono::Duration::seconds(config.simulation.block_time_secs),
        submissions,
    )?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn handle_query_command(config_path: &str, command: QueryCommands) -> anyhow::Result<()> {
    let config = NodeConfig::from_file(config_path)?;
    if config.storage.backend == StorageBackend::Memory {
        anyhow::bail!("memory backend keeps no state between runs; nothing to query");
    }

    let node = open_node(&config)?;
    if !node.is_initialized() {
        anyhow::bail!("no chain state at {}; run `simulate` first", config.db_path());
    }

    let output = match command {
        QueryCommands::Cycle => {
            let now = node.last_block_time()?;
            let cycle = node
                .current_cycle()?
                .ok_or_else(|| anyhow::anyhow!("no funding cycle stored"))?;
            serde_json::json!({
                "cycle": cycle,
                "active": node.check_cycle_active(now),
                "as_of": now,
            })
        }
        QueryCommands::Minter => serde_json::json!({
            "minter": node.minter()?,
            "block_provision": node.block_provision()?,
            "next_weekly_supply": node.next_weekly_supply()?,
        }),
        QueryCommands::Results { cycle_id } => match node.cycle_results(cycle_id)? {
            Some(results) => serde_json::to_value(results)?,
            None => anyhow::bail!("no results stored for cycle #{}", cycle_id),
        },
        QueryCommands::Projected => serde_json::to_value(node.projected_eligibility()?)?,
        QueryCommands::Export => serde_json::to_value(node.export_state()?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
