//! Integration test utilities for the presence engine
//!
//! This crate drives a provider end to end through the protocol event
//! router, with in-memory collaborators standing in for the network.

pub mod helpers;
pub mod fixtures;

pub use helpers::*;
pub use fixtures::*;
