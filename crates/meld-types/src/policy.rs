use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Which side wins when two documents disagree on a leaf value.
///
/// The policy only applies to leaf conflicts: a key present in both
/// documents where at least one value is not an object. Keys present in a
/// single document always pass through, and object/object pairs always
/// merge recursively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// The later (higher-index) document wins.
    #[default]
    Override,
    /// The earlier (lower-index) document wins.
    Preserve,
}

impl MergePolicy {
    /// Returns `true` if later documents win.
    pub fn is_override(self) -> bool {
        matches!(self, Self::Override)
    }

    /// Pick the winner of a leaf conflict between `earlier` and `later`.
    pub fn pick<T>(self, earlier: T, later: T) -> T {
        match self {
            Self::Override => later,
            Self::Preserve => earlier,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Preserve => "preserve",
        }
    }
}

impl From<bool> for MergePolicy {
    fn from(override_existing: bool) -> Self {
        if override_existing {
            Self::Override
        } else {
            Self::Preserve
        }
    }
}

impl From<MergePolicy> for bool {
    fn from(policy: MergePolicy) -> Self {
        policy.is_override()
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "override" | "true" => Ok(Self::Override),
            "preserve" | "false" => Ok(Self::Preserve),
            other => Err(TypeError::InvalidPolicy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_override() {
        assert_eq!(MergePolicy::default(), MergePolicy::Override);
    }

    #[test]
    fn from_bool() {
        assert_eq!(MergePolicy::from(true), MergePolicy::Override);
        assert_eq!(MergePolicy::from(false), MergePolicy::Preserve);
        assert!(bool::from(MergePolicy::Override));
        assert!(!bool::from(MergePolicy::Preserve));
    }

    #[test]
    fn pick_follows_policy() {
        assert_eq!(*MergePolicy::Override.pick(&1, &2), 2);
        assert_eq!(*MergePolicy::Preserve.pick(&1, &2), 1);
        assert_eq!(MergePolicy::Preserve.pick(String::from("a"), String::from("b")), "a");
    }

    #[test]
    fn parse_names() {
        assert_eq!("override".parse::<MergePolicy>().unwrap(), MergePolicy::Override);
        assert_eq!(" Preserve ".parse::<MergePolicy>().unwrap(), MergePolicy::Preserve);
        assert_eq!("false".parse::<MergePolicy>().unwrap(), MergePolicy::Preserve);
        assert_eq!(
            "latest".parse::<MergePolicy>().unwrap_err(),
            TypeError::InvalidPolicy("latest".into())
        );
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&MergePolicy::Preserve).unwrap();
        assert_eq!(json, "\"preserve\"");
    }
}
