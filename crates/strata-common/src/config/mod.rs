//! Configuration for StrataDB.
//!
//! This module provides the configuration consumed by the storage engine
//! and the execution layer.

mod engine;

pub use engine::{EngineConfig, EngineConfigBuilder};
