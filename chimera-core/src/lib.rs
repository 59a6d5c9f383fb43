//! CHIMERA Nexus Core - hybrid threat chain model
//!
//! This crate provides the analytical primitives:
//! - Signals (graph vertices) and Links (graph edges) validated at construction
//! - The Chain aggregate with referential integrity on every edge
//! - Coherence (CCS) and information pressure (IAP) metrics
//! - The cognitive auditor that critiques the analyst's reasoning
//!
//! Nothing in here touches the filesystem or the network.

pub mod error;
pub mod domain;
pub mod signals;
pub mod chain;
pub mod metrics;
pub mod auditor;

pub use error::*;
pub use domain::*;
pub use signals::*;
pub use chain::*;
pub use metrics::*;
pub use auditor::*;

/// Minimum length (in characters) of a signal classification
pub const MIN_SIGNAL_TYPE_LEN: usize = 3;

/// Minimum length (in characters) of a chain name
pub const MIN_CHAIN_NAME_LEN: usize = 3;

/// Default link weight
pub const DEFAULT_LINK_WEIGHT: f64 = 1.0;

/// Confidence floor used by the pressure calculation
pub const CONFIDENCE_FLOOR: f64 = 0.1;

/// Urgency baseline used when nothing more specific is known
pub const DEFAULT_URGENCY: f64 = 5.0;
