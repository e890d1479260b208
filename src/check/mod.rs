//! The check contract and the fixed set of report card checks.
//!
//! A check scores a set of files between 0.0 and 1.0 and reports the issues
//! it found per file. The aggregation engine only depends on the [`Check`]
//! trait; the concrete analyzers live in the submodules.

mod license;
mod misspell;
mod tool;

use std::path::{Path, PathBuf};

pub use license::License;
pub use misspell::Misspell;
pub use tool::{OutputFormat, ToolCheck};

/// A single issue found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueEntry {
    /// 1-based line number. File-level issues use line 1.
    pub line: usize,
    pub description: String,
}

/// All issues one check found in one file, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSummary {
    pub filename: String,
    pub issues: Vec<IssueEntry>,
}

impl FileSummary {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            issues: Vec::new(),
        }
    }

    /// Record an issue at the given line.
    pub fn add_issue(&mut self, line: usize, description: impl Into<String>) {
        self.issues.push(IssueEntry {
            line,
            description: description.into(),
        });
    }
}

/// The outcome of evaluating a check.
///
/// A check that fails part way still reports whatever percentage and
/// summaries it produced; `error` only annotates the result.
#[derive(Debug, Default)]
pub struct Evaluation {
    pub percentage: f64,
    pub summaries: Vec<FileSummary>,
    pub error: Option<anyhow::Error>,
}

impl Evaluation {
    pub fn new(percentage: f64, summaries: Vec<FileSummary>) -> Self {
        Self {
            percentage,
            summaries,
            error: None,
        }
    }

    /// Attach an error to an otherwise usable result.
    pub fn with_error(mut self, error: anyhow::Error) -> Self {
        self.error = Some(error);
        self
    }
}

/// A pluggable analyzer run by the aggregation engine.
///
/// Implementations must not share mutable state with other checks; each one
/// is moved into its own task.
pub trait Check: Send + Sync {
    /// Stable identifier, used as the threshold key and report label.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Relative contribution to the composite score.
    fn weight(&self) -> f64;

    /// Score `files`. May block.
    fn evaluate(&self, files: &[PathBuf]) -> Evaluation;
}

/// Names of every check in [`default_checks`], in report order.
pub const CHECK_NAMES: &[&str] = &[
    "gofmt",
    "go_vet",
    "golint",
    "gocyclo",
    "license",
    "misspell",
    "ineffassign",
];

/// Cyclomatic complexity above which gocyclo reports a function.
pub const CYCLO_OVER: u32 = 15;

/// Build the fixed report card check list for a project rooted at `dir`.
pub fn default_checks(dir: &Path) -> Vec<Box<dyn Check>> {
    vec![
        Box::new(
            ToolCheck::new(
                "gofmt",
                "Gofmt formats Go programs. We run gofmt -s on your code, where -s is for the \"simplify\" command",
                0.30,
                dir,
                "gofmt",
                OutputFormat::FileList,
            )
            .args(["-s", "-l"]),
        ),
        Box::new(
            ToolCheck::new(
                "go_vet",
                "go vet examines Go source code and reports suspicious constructs, such as Printf calls whose arguments do not align with the format string.",
                0.25,
                dir,
                "go",
                OutputFormat::FileLine,
            )
            .args(["vet", "./..."])
            .without_file_args(),
        ),
        Box::new(ToolCheck::new(
            "golint",
            "Golint is a linter for Go source code.",
            0.10,
            dir,
            "golint",
            OutputFormat::FileLine,
        )),
        Box::new(
            ToolCheck::new(
                "gocyclo",
                "Gocyclo calculates cyclomatic complexities of functions in Go source code. The cyclomatic complexity of a function is calculated according to the following rules: 1 is the base complexity of a function, +1 for each 'if', 'for', 'case', '&&' or '||'.",
                0.10,
                dir,
                "gocyclo",
                OutputFormat::Cyclo,
            )
            .args(["-over".to_string(), CYCLO_OVER.to_string()]),
        ),
        Box::new(License::new(dir)),
        Box::new(Misspell::new(dir)),
        Box::new(ToolCheck::new(
            "ineffassign",
            "IneffAssign detects ineffectual assignments in Go code.",
            0.05,
            dir,
            "ineffassign",
            OutputFormat::FileLine,
        )),
    ]
}

/// Fraction of `total` files that had no issues.
pub(crate) fn clean_fraction(total: usize, files_with_issues: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    let clean = total.saturating_sub(files_with_issues);
    clean as f64 / total as f64
}

/// Display form of a file path relative to the project root.
pub(crate) fn display_path(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    s.strip_prefix("./").map(str::to_string).unwrap_or(s)
}
