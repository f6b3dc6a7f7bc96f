//! # Cross-Subsystem Scenarios
//!
//! | Module | Flow |
//! |--------|------|
//! | `registration` | node asks to join → oracles vote → oracle key hand-off |
//! | `data_deal` | seller submission → verification vote → re-encrypted delivery |
//! | `upgrade` | upgrade vote ends → gate hands voting to the new version |
//! | `pipeline` | chain events → event bridge → bus → reactor |
//! | `sealing` | sealed keys across restarts and enclave versions |

pub mod data_deal;
pub mod pipeline;
pub mod registration;
pub mod sealing;
pub mod upgrade;
