//! # Outbound Ports
//!
//! Access to the local enclave's report generation.

use crate::domain::{AttestationError, REPORT_DATA_LEN};

/// The local enclave.
pub trait EnclavePort: Send + Sync {
    /// Produce an encoded, signed report over `report_data`.
    fn generate_report(&self, report_data: [u8; REPORT_DATA_LEN]) -> Result<Vec<u8>, AttestationError>;
}
