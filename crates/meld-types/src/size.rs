use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// A byte count.
///
/// Plan limits and usage panels speak in megabytes (`bytes / 1024²`), while
/// everything that is actually measured is measured in bytes. `ByteSize`
/// keeps the measured value exact and converts only for display and for
/// limits given in megabytes.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const ZERO: Self = Self(0);

    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Convert a megabyte figure (possibly fractional) to bytes, rounding to
    /// the nearest byte.
    pub fn from_megabytes(mb: f64) -> Result<Self, TypeError> {
        if !mb.is_finite() || mb < 0.0 {
            return Err(TypeError::InvalidSize(format!(
                "megabytes must be a non-negative number, got {mb}"
            )));
        }
        Ok(Self((mb * BYTES_PER_MEGABYTE).round() as u64))
    }

    pub const fn as_bytes(self) -> u64 {
        self.0
    }

    pub fn as_megabytes(self) -> f64 {
        self.0 as f64 / BYTES_PER_MEGABYTE
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl From<usize> for ByteSize {
    fn from(bytes: usize) -> Self {
        Self(bytes as u64)
    }
}

impl Add for ByteSize {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for ByteSize {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for ByteSize {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} MB", self.as_megabytes())
    }
}
