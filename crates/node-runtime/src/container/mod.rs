//! # Node Container
//!
//! Configuration of every subsystem and the runtime parameters that tie
//! them together.

pub mod config;

pub use config::{
    ChainConfig, ConfigError, ContentStoreConfig, EnclaveConfig, NodeConfig,
};
