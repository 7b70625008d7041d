// node/src/lib.rs
pub mod config;
pub mod runtime;
pub mod simulation;

pub use config::NodeConfig;
pub use runtime::{BlockReport, Node};
pub use simulation::{run_simulation, ProposalSubmission, SimulationSummary};
