//! # OC-02 Attestation
//!
//! Authenticates peer oracle nodes by their enclave measurements.
//!
//! **Subsystem ID:** 2  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Verification Stages
//!
//! | Stage | Check | Failure |
//! |-------|-------|---------|
//! | 1 | certificate chain to the pinned vendor root, report signature | `InvalidReport` |
//! | 2 | security version ≥ configured minimum | `StaleVersion` |
//! | 3 | `product_id`, `signer_id`, `unique_id` equal expected | `IdentityMismatch` |
//! | 4 | report data prefix equals SHA-256 of the vouched key | `DataMismatch` |
//!
//! The first failing stage is returned. Nothing is cached between calls.
//!
//! ## Module Structure
//!
//! ```text
//! oc-02-attestation/
//! ├── domain/          # RemoteReport, ReportBody, Certificate, errors
//! ├── algorithms/      # Ordered verification stages
//! ├── ports/           # AttestationApi (inbound), EnclavePort (outbound)
//! ├── adapters/        # SimulatedEnclave
//! ├── application/     # AttestationService
//! └── config.rs        # AttestationConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::SimulatedEnclave;
pub use algorithms::verify_report;
pub use application::AttestationService;
pub use config::AttestationConfig;
pub use domain::{
    key_binding, report_data_for, AttestationError, Certificate, RemoteReport, ReportBody,
    REPORT_DATA_LEN,
};
pub use ports::{AttestationApi, EnclavePort};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
