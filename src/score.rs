//! Scoring and grading for a report card run.
//!
//! Each check yields a [`Score`]. The composite is the weight-averaged
//! percentage of all scores; the overall verdict passes only when every
//! check meets its own threshold.

use crate::check::FileSummary;
use crate::error::{ReportCardError, Result};
use crate::threshold::ThresholdMap;

/// Grade boundaries on the 0-100 composite scale.
pub mod grades {
    pub const A_PLUS_MIN: f64 = 90.0;
    pub const A_MIN: f64 = 80.0;
    pub const B_MIN: f64 = 70.0;
    pub const C_MIN: f64 = 60.0;
    pub const D_MIN: f64 = 50.0;
    pub const E_MIN: f64 = 40.0;
}

/// Letter grade for the composite score. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    APlus,
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    /// Grade for a composite in 0.0-1.0.
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage * 100.0 {
            p if p >= grades::A_PLUS_MIN => Grade::APlus,
            p if p >= grades::A_MIN => Grade::A,
            p if p >= grades::B_MIN => Grade::B,
            p if p >= grades::C_MIN => Grade::C,
            p if p >= grades::D_MIN => Grade::D,
            p if p >= grades::E_MIN => Grade::E,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The result of one check in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub name: String,
    pub description: String,
    pub weight: f64,
    /// 0.0-1.0
    pub percentage: f64,
    pub file_summaries: Vec<FileSummary>,
    /// Set when the check failed part way; the percentage still counts.
    pub error: Option<String>,
}

impl Score {
    pub fn has_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// Pass/fail outcome of one check against its threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckVerdict {
    pub name: String,
    pub threshold: f64,
    pub passed: bool,
}

/// Composite score and overall verdict for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Weighted mean of all percentages, 0.0-1.0.
    pub percentage: f64,
    pub grade: Grade,
    /// Per-check verdicts in report order.
    pub verdicts: Vec<CheckVerdict>,
    /// True only when every check passed.
    pub passed: bool,
}

impl AggregateResult {
    /// Verdict for the named check.
    pub fn verdict(&self, name: &str) -> Option<&CheckVerdict> {
        self.verdicts.iter().find(|v| v.name == name)
    }
}

/// `Σ(percentage × weight) / Σ weight`.
///
/// Fails when the total weight is zero, which includes an empty score list.
pub fn composite(scores: &[Score]) -> Result<f64> {
    let (total, total_weight) = scores.iter().fold((0.0, 0.0), |(t, w), s| {
        (t + s.percentage * s.weight, w + s.weight)
    });

    if total_weight <= 0.0 {
        return Err(ReportCardError::ZeroWeight);
    }

    Ok(total / total_weight)
}

/// Evaluate every score against its threshold.
pub fn evaluate_thresholds(scores: &[Score], thresholds: &ThresholdMap) -> Vec<CheckVerdict> {
    scores
        .iter()
        .map(|s| CheckVerdict {
            name: s.name.clone(),
            threshold: thresholds.get(&s.name),
            passed: thresholds.passes(&s.name, s.percentage),
        })
        .collect()
}

/// Compute the composite, grade and verdicts for a completed run.
pub fn calculate(scores: &[Score], thresholds: &ThresholdMap) -> Result<AggregateResult> {
    let percentage = composite(scores)?;
    let verdicts = evaluate_thresholds(scores, thresholds);
    let passed = verdicts.iter().all(|v| v.passed);

    Ok(AggregateResult {
        percentage,
        grade: Grade::from_percentage(percentage),
        verdicts,
        passed,
    })
}
