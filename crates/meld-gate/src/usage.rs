use std::fmt;

use meld_types::ByteSize;
use serde::{Deserialize, Serialize};

/// Plan usage at the moment a request was evaluated.
///
/// This is the payload of a limit-exceeded denial: it carries what the
/// upgrade path needs to explain itself (the limit, what was already used,
/// and what the caller tried to add).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    pub limit: ByteSize,
    pub used: ByteSize,
    pub attempted: ByteSize,
}

impl UsageReport {
    pub fn new(limit: ByteSize, used: ByteSize, attempted: ByteSize) -> Self {
        Self {
            limit,
            used,
            attempted,
        }
    }

    /// Usage if the attempted upload were accepted.
    pub fn total(&self) -> ByteSize {
        self.used + self.attempted
    }

    /// Returns `true` if accepting the attempt would exceed the limit.
    pub fn exceeds_limit(&self) -> bool {
        self.total() > self.limit
    }

    /// Storage left after the attempt, or zero.
    pub fn remaining(&self) -> ByteSize {
        self.limit.saturating_sub(self.total())
    }

    /// Share of the limit that `total()` represents, as a percentage.
    ///
    /// A zero limit is fully consumed by any usage at all.
    pub fn percent_used(&self) -> f64 {
        if self.limit == ByteSize::ZERO {
            return if self.total() == ByteSize::ZERO { 0.0 } else { 100.0 };
        }
        self.total().as_bytes() as f64 / self.limit.as_bytes() as f64 * 100.0
    }
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "limit {}, already used {}, attempted {} ({:.2}% of plan)",
            self.limit,
            self.used,
            self.attempted,
            self.percent_used()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mb(n: u64) -> ByteSize {
        ByteSize::from_bytes(n * 1024 * 1024)
    }

    #[test]
    fn totals_and_remaining() {
        let report = UsageReport::new(mb(50), mb(20), mb(10));
        assert_eq!(report.total(), mb(30));
        assert_eq!(report.remaining(), mb(20));
        assert!(!report.exceeds_limit());
    }

    #[test]
    fn exactly_at_limit_does_not_exceed() {
        let report = UsageReport::new(mb(50), mb(49), mb(1));
        assert!(!report.exceeds_limit());
        assert_eq!(report.remaining(), ByteSize::ZERO);
    }

    #[test]
    fn over_limit() {
        let report = UsageReport::new(mb(50), mb(49), mb(2));
        assert!(report.exceeds_limit());
        assert_eq!(report.remaining(), ByteSize::ZERO);
        assert!((report.percent_used() - 102.0).abs() < 1e-9);
    }

    #[test]
    fn zero_limit_percentages() {
        assert_eq!(UsageReport::new(ByteSize::ZERO, ByteSize::ZERO, ByteSize::ZERO).percent_used(), 0.0);
        assert_eq!(UsageReport::new(ByteSize::ZERO, ByteSize::ZERO, mb(1)).percent_used(), 100.0);
    }

    #[test]
    fn display_mentions_all_figures() {
        let text = UsageReport::new(mb(50), mb(49), mb(2)).to_string();
        assert_eq!(
            text,
            "limit 50.00 MB, already used 49.00 MB, attempted 2.00 MB (102.00% of plan)"
        );
    }
}
