//! # Adapters
//!
//! Enclave implementations.

pub mod simulated;

pub use simulated::SimulatedEnclave;
