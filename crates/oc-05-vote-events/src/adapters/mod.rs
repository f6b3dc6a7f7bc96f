//! # Adapters

pub mod context;

pub use context::OracleContext;
