//! # Oracle Node Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Trust-path benchmarks (criterion)
//! └── src/
//!     ├── fixture.rs    # Mock chain, oracle nodes and parties of a deal
//!     └── integration/  # Cross-subsystem scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p oc-tests
//! cargo test -p oc-tests integration::registration
//! cargo bench -p oc-tests
//! ```

pub mod fixture;
pub mod integration;
