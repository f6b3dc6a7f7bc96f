//! # Domain Module
//!
//! Sealed blob format, key slots and secret buffers.

pub mod entities;
pub mod errors;
pub mod secret;

pub use entities::*;
pub use errors::*;
pub use secret::*;
