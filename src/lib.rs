//! reportcard - a Go report card quality gate.
//!
//! Runs a fixed set of code-quality checks over a Go project, combines their
//! pass percentages into one weighted score and compares each check against a
//! minimum threshold.
//!
//! # Architecture
//!
//! - `check`: the `Check` trait and the concrete gofmt/vet/lint/... checks
//! - `threshold`: `name=percent` parsing into a validated `ThresholdMap`
//! - `config`: optional YAML config file
//! - `discover`: Go file discovery and temporary exclusion of skipped files
//! - `engine`: concurrent execution and fan-in of all checks
//! - `score`: composite score, per-check verdicts and grade
//! - `report`: text output
//!
//! # Adding a Check
//!
//! Implement [`Check`] and add it to [`check::default_checks`] and
//! [`check::CHECK_NAMES`].

pub mod check;
pub mod cli;
pub mod config;
pub mod discover;
pub mod engine;
pub mod error;
pub mod report;
pub mod score;
pub mod threshold;

pub use check::{Check, Evaluation, FileSummary, IssueEntry};
pub use config::Config;
pub use engine::{Engine, RunOutcome};
pub use error::{ReportCardError, Result, ThresholdError};
pub use score::{AggregateResult, Grade, Score};
pub use threshold::ThresholdMap;
