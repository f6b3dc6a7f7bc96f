//! # Algorithms
//!
//! Sealing-key derivation and blob sealing.

pub mod sealing;

pub use sealing::{derive_sealing_key, seal_with_key, unseal_with_key};
