//! # Domain Module
//!
//! Remote report format and attestation errors.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
