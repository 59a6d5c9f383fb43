//! CHIMERA Nexus Storage Layer
//!
//! Persists chains as checksummed JSON snapshots:
//! - Atomic write-temp-then-rename saves
//! - Distinct not-found / corrupt / unavailable failures
//! - Re-validation of every chain invariant on load

pub mod snapshot;
pub mod repository;

pub use snapshot::*;
pub use repository::*;
