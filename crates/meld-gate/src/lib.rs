//! Quota gate pipeline for JSON Meld.
//!
//! Every merge request passes through the gate before the merge engine is
//! called. The gate runs a configurable pipeline of stages (document count,
//! plan quota, ...) and either admits the request or denies it. A quota
//! denial carries the limit, the storage already used, and the attempted
//! upload so the caller can route to the upgrade path.
//!
//! # Quick Start
//!
//! ```rust
//! use meld_gate::{GateConfig, MergeGate, MergeRequest};
//! use meld_types::ByteSize;
//!
//! let gate = MergeGate::with_default_stages(GateConfig::default());
//! let request = MergeRequest::new(2, ByteSize::from_bytes(2048));
//! let result = gate.evaluate(&request).unwrap();
//! assert!(result.is_admitted());
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod stage;
pub mod stages;
pub mod usage;

// Re-exports for convenience.
pub use config::{GateConfig, DEFAULT_LIMIT_MB};
pub use error::GateError;
pub use gate::{Denial, GateOutcome, GateResult, MergeGate};
pub use stage::{GateContext, GateStage, MergeRequest, StageDecision, StageResult};
pub use stages::{DocumentCountStage, QuotaStage};
pub use usage::UsageReport;
