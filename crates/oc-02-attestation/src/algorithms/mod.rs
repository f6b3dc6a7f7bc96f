//! # Algorithms
//!
//! Ordered remote report verification.

pub mod verify;

pub use verify::{
    check_binding, check_identity, check_security_version, verify_report, verify_signature_chain,
};
