//! # Domain Module
//!
//! Event kinds, parsed events, decisions and errors.

pub mod decision;
pub mod errors;
pub mod events;

pub use decision::*;
pub use errors::*;
pub use events::*;
