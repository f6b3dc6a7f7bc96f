//! # Adapters

pub mod trusted_account;

pub use trusted_account::TrustedAccountReader;
