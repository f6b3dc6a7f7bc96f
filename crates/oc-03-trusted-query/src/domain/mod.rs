//! # Domain Module
//!
//! Light blocks, the light store, state proofs and errors.

pub mod errors;
pub mod light_block;
pub mod light_store;
pub mod proof;
pub mod trust;

pub use errors::*;
pub use light_block::*;
pub use light_store::*;
pub use proof::*;
pub use trust::*;
