//! # Adapters
//!
//! Filesystem storage and the platform sealing-key provider.

pub mod file_store;
pub mod platform;

pub use file_store::FileSealedStore;
pub use platform::{PlatformSealingKeyProvider, PLATFORM_SECRET_LEN};
