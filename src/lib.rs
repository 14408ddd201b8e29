//! Witnet oracle client for the VotingWithOracle contract.
//!
//! This library exports the request model, the chain boundary and the
//! workflows driven by the command-line tools in `src/bin`.

pub mod chain;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

pub use error::{OracleError, Result};
