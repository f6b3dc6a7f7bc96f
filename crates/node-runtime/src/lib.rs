//! # Oracle Node Runtime
//!
//! Library half of the `oracle-node` binary: configuration, the network
//! adapters behind the subsystem ports, and the startup wiring.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: subsystems define ports, this crate supplies
//!   the HTTP and filesystem adapters
//! - **Event-Driven**: chain events reach the reactor only through the bus

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod wiring;

pub use container::NodeConfig;
pub use wiring::{OracleNode, StartupError};
