//! # Ports
//!
//! Inbound verification API and the outbound enclave port.

pub mod inbound;
pub mod outbound;

pub use inbound::AttestationApi;
pub use outbound::EnclavePort;
