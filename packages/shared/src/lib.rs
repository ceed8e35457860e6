//! Shared utilities for osc-relay.

pub mod logger;
pub mod time;
