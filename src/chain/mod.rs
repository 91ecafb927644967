//! Chain Adapter: thin façade over the simulation/submission RPC endpoint
//! and the account-sequence endpoint. Network I/O only; no local mutable
//! state beyond the configured endpoints.

mod client;
mod errors;

pub use client::{read_identity, ChainClient, Simulation, SimulationCost};
pub use errors::ChainError;
