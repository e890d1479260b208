//! Per-check minimum percentages.
//!
//! Thresholds come from repeated `--check <name>=<percent>` flags and the
//! optional config file. They are validated up front so a bad entry stops the
//! run before any check is started.

use std::collections::HashMap;

use crate::error::ThresholdError;

/// Threshold used for checks without an explicit entry.
pub const DEFAULT_THRESHOLD: f64 = 0.0;

/// Minimum required percentage (0-100) per check name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdMap {
    minimums: HashMap<String, f64>,
}

impl ThresholdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a sequence of `name=percent` specs. Later specs for the same
    /// name replace earlier ones.
    pub fn parse<I, S>(specs: I, known: &[&str]) -> Result<Self, ThresholdError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for spec in specs {
            map.insert_spec(spec.as_ref(), known)?;
        }
        Ok(map)
    }

    /// Parse one `name=percent` spec and insert it.
    pub fn insert_spec(&mut self, spec: &str, known: &[&str]) -> Result<(), ThresholdError> {
        let (name, value) = spec
            .split_once('=')
            .ok_or_else(|| ThresholdError::MissingSeparator {
                spec: spec.to_string(),
            })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ThresholdError::EmptyName {
                spec: spec.to_string(),
            });
        }

        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| ThresholdError::NotANumber {
                spec: spec.to_string(),
                value: value.to_string(),
            })?;

        self.set(name, value, known)
    }

    /// Set the threshold for `name` after validating name and range.
    pub fn set(&mut self, name: &str, value: f64, known: &[&str]) -> Result<(), ThresholdError> {
        if !known.contains(&name) {
            return Err(ThresholdError::UnknownCheck {
                name: name.to_string(),
                known: known.join(", "),
            });
        }
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(ThresholdError::OutOfRange {
                name: name.to_string(),
                value,
            });
        }
        self.minimums.insert(name.to_string(), value);
        Ok(())
    }

    /// Overlay `other` on top of this map; entries in `other` win.
    pub fn merge(&mut self, other: ThresholdMap) {
        self.minimums.extend(other.minimums);
    }

    /// Minimum percentage for `name`, or [`DEFAULT_THRESHOLD`].
    pub fn get(&self, name: &str) -> f64 {
        self.minimums
            .get(name)
            .copied()
            .unwrap_or(DEFAULT_THRESHOLD)
    }

    /// Whether a check scoring `percentage` (0.0-1.0) meets its threshold.
    pub fn passes(&self, name: &str, percentage: f64) -> bool {
        percentage * 100.0 >= self.get(name)
    }

    pub fn len(&self) -> usize {
        self.minimums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minimums.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &[&str] = &["gofmt", "golint", "go_vet"];

    #[test]
    fn test_parse_thresholds() {
        let map = ThresholdMap::parse(["gofmt=90", "golint=62.5"], KNOWN).unwrap();
        assert_eq!(map.get("gofmt"), 90.0);
        assert_eq!(map.get("golint"), 62.5);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_missing_entry_defaults_to_zero() {
        let map = ThresholdMap::parse(["gofmt=90"], KNOWN).unwrap();
        assert_eq!(map.get("go_vet"), 0.0);
        assert!(map.passes("go_vet", 0.0));
    }

    #[test]
    fn test_last_write_wins() {
        let map = ThresholdMap::parse(["gofmt=90", "gofmt=10"], KNOWN).unwrap();
        assert_eq!(map.get("gofmt"), 10.0);
    }

    #[test]
    fn test_splits_on_first_separator() {
        let err = ThresholdMap::parse(["gofmt=5=6"], KNOWN).unwrap_err();
        assert!(matches!(err, ThresholdError::NotANumber { ref value, .. } if value == "5=6"));
    }

    #[test]
    fn test_malformed_specs() {
        assert!(matches!(
            ThresholdMap::parse(["gofmt"], KNOWN),
            Err(ThresholdError::MissingSeparator { .. })
        ));
        assert!(matches!(
            ThresholdMap::parse(["=50"], KNOWN),
            Err(ThresholdError::EmptyName { .. })
        ));
        assert!(matches!(
            ThresholdMap::parse(["gofmt=high"], KNOWN),
            Err(ThresholdError::NotANumber { .. })
        ));
        assert!(matches!(
            ThresholdMap::parse(["gofmt=NaN"], KNOWN),
            Err(ThresholdError::OutOfRange { .. })
        ));
        assert!(matches!(
            ThresholdMap::parse(["gofmt=101"], KNOWN),
            Err(ThresholdError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_unknown_check_rejected() {
        let err = ThresholdMap::parse(["gofmtt=50"], KNOWN).unwrap_err();
        assert!(err.to_string().contains("gofmtt"));
        assert!(err.to_string().contains("go_vet"));
    }

    #[test]
    fn test_passes_boundary() {
        let map = ThresholdMap::parse(["gofmt=50"], KNOWN).unwrap();
        assert!(map.passes("gofmt", 0.5));
        assert!(!map.passes("gofmt", 0.49));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = ThresholdMap::parse(["gofmt=90", "golint=40"], KNOWN).unwrap();
        base.merge(ThresholdMap::parse(["gofmt=70"], KNOWN).unwrap());
        assert_eq!(base.get("gofmt"), 70.0);
        assert_eq!(base.get("golint"), 40.0);
    }
}
