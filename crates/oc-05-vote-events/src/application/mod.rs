//! # Application Layer
//!
//! Vote decisions, the upgrade gate and the event reactor.

pub mod decide;
pub mod gate;
pub mod reactor;

#[cfg(test)]
pub(crate) mod fixture;

pub use gate::UpgradeGate;
pub use reactor::{EventReactor, ReactorHandle};
