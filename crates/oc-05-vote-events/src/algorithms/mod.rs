//! # Algorithms
//!
//! Pure decision building blocks: schema checks and re-encryption.

pub mod reencrypt;
pub mod schema;

pub use reencrypt::{delivery_nonce, open_submission, seal_for_buyer};
pub use schema::validate_against_schema;
