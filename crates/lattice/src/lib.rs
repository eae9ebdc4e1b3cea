//! Lattice
//!
//! Governance layer for automated work: intents move through an approval
//! lifecycle, humans decide on issue threads, and the artifacts an intent
//! produces (pull requests above all) are tracked back to it.
//!
//! This crate wires the pieces together. The building blocks live in:
//!
//! - `lattice_intent`: the lifecycle state machine
//! - `lattice_governance`: labels, comment protocol, approval bridge
//! - `lattice_registry`: artifact registry and PR tracker actors
//! - `lattice_events`: the event bus connecting them

pub mod config;
pub mod runtime;

pub use config::{load_config, load_default_config, ConfigError, LatticeConfig};
pub use runtime::Lattice;
