//! spikebus CLI crate
//!
//! Purpose:
//! - Drive the behavioural neuron core from the command line.
//! - Run stimulus scenarios (TOML) and export per-edge traces as JSON.
//! - Run the firing/decay/refractory/reset contract suite against a
//!   parameter set and report pass/fail.
//!
//! The binary (src/main.rs) wires up logging and argument parsing, calling
//! [`SpikebusCli::execute`]. Command modules are public so integration tests
//! and downstream automation can invoke them without spawning a process.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::SpikebusCli;
