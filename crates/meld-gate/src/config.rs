use meld_types::ByteSize;
use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Plan limit of the default (free) tier, in megabytes.
pub const DEFAULT_LIMIT_MB: f64 = 50.0;

/// Configuration for the quota gate pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Storage the caller's plan allows, in bytes.
    pub limit: ByteSize,
    /// Storage the caller has already consumed, in bytes.
    pub used: ByteSize,
    /// When `true`, every request is admitted without running any stage.
    pub permissive: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            limit: ByteSize::from_bytes(DEFAULT_LIMIT_MB as u64 * 1024 * 1024),
            used: ByteSize::ZERO,
            permissive: false,
        }
    }
}

impl GateConfig {
    /// A configuration that admits everything.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Default::default()
        }
    }

    /// Build a configuration from plan figures given in megabytes.
    pub fn from_megabytes(limit_mb: f64, used_mb: f64) -> Result<Self, GateError> {
        Ok(Self {
            limit: ByteSize::from_megabytes(limit_mb)?,
            used: ByteSize::from_megabytes(used_mb)?,
            permissive: false,
        })
    }

    /// Storage left before any new upload.
    pub fn headroom(&self) -> ByteSize {
        self.limit.saturating_sub(self.used)
    }
}
