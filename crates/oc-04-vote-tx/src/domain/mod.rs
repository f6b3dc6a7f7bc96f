//! # Domain Module
//!
//! Vote messages, transactions and errors.

pub mod errors;
pub mod messages;
pub mod tx;

pub use errors::*;
pub use messages::*;
pub use tx::*;
