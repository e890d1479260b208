//! Error types for reportcard.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while parsing `name=percent` threshold specifications.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("invalid threshold {spec:?}: expected <check>=<percent>")]
    MissingSeparator { spec: String },
    #[error("invalid threshold {spec:?}: check name is empty")]
    EmptyName { spec: String },
    #[error("invalid threshold {spec:?}: {value:?} is not a float")]
    NotANumber { spec: String, value: String },
    #[error("invalid threshold for {name}: {value} is outside 0-100")]
    OutOfRange { name: String, value: f64 },
    #[error("unknown check {name:?} (known checks: {known})")]
    UnknownCheck { name: String, known: String },
}

/// Errors that abort a run before or during aggregation.
#[derive(Error, Debug)]
pub enum ReportCardError {
    #[error(transparent)]
    Threshold(#[from] ThresholdError),

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("failed to parse config {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("could not get filenames: {0}")]
    Discovery(#[from] walkdir::Error),

    #[error("no .go files found in {0}")]
    NoFiles(PathBuf),

    #[error("duplicate check name {0:?}")]
    DuplicateCheck(String),

    #[error("check {name:?} has invalid weight {weight}")]
    InvalidWeight { name: String, weight: f64 },

    #[error("total check weight is zero, composite score is undefined")]
    ZeroWeight,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportCardError>;
