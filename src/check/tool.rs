//! Checks backed by an external Go tool.
//!
//! The tool is run in the project root and its output is parsed into
//! per-file summaries. The score is the fraction of analyzed files the tool
//! had nothing to say about. A tool that fails without reporting anything
//! scores zero.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::Regex;

use super::{clean_fraction, display_path, Check, Evaluation, FileSummary};

lazy_static! {
    /// `path/file.go:12:5: message` or `path/file.go:12: message`
    static ref FILE_LINE_RE: Regex =
        Regex::new(r"^(?P<file>[^\s:][^:]*\.go):(?P<line>\d+)(?::\d+)?:\s*(?P<msg>.*)$").unwrap();

    /// `16 main handle path/file.go:40:1`
    static ref CYCLO_RE: Regex = Regex::new(
        r"^(?P<complexity>\d+)\s+(?P<pkg>\S+)\s+(?P<func>\S+)\s+(?P<file>\S+\.go):(?P<line>\d+):\d+$"
    )
    .unwrap();
}

/// How a tool reports its findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One offending file per line (`gofmt -l`).
    FileList,
    /// Compiler style `file:line[:col]: message`.
    FileLine,
    /// gocyclo's `<complexity> <package> <function> <file:line:col>`.
    Cyclo,
}

/// A finding parsed from tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Finding {
    file: String,
    line: usize,
    message: String,
}

/// A check that shells out to an external analyzer.
pub struct ToolCheck {
    name: String,
    description: String,
    weight: f64,
    dir: PathBuf,
    program: String,
    args: Vec<String>,
    format: OutputFormat,
    pass_files: bool,
}

impl ToolCheck {
    pub fn new(
        name: &str,
        description: &str,
        weight: f64,
        dir: &Path,
        program: &str,
        format: OutputFormat,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            weight,
            dir: dir.to_path_buf(),
            program: program.to_string(),
            args: Vec::new(),
            format,
            pass_files: true,
        }
    }

    /// Arguments placed before the file list.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the tool on the whole project instead of the file list.
    pub fn without_file_args(mut self) -> Self {
        self.pass_files = false;
        self
    }

    fn parse(&self, stdout: &str, stderr: &str) -> Vec<Finding> {
        match self.format {
            OutputFormat::FileList => {
                // gofmt reports files it cannot parse on stderr.
                let mut findings = parse_file_list(stdout);
                findings.extend(parse_file_line(stderr));
                findings
            }
            OutputFormat::FileLine => {
                let mut findings = parse_file_line(stdout);
                findings.extend(parse_file_line(stderr));
                findings
            }
            OutputFormat::Cyclo => parse_cyclo(stdout),
        }
    }
}

impl Check for ToolCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn evaluate(&self, files: &[PathBuf]) -> Evaluation {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.dir).args(&self.args);
        if self.pass_files {
            cmd.args(files);
        }

        tracing::debug!(check = %self.name, program = %self.program, "running tool");

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                return Evaluation::default()
                    .with_error(anyhow!("could not run {}: {}", self.program, e));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let findings = self.parse(&stdout, &stderr);
        let summaries = group_by_file(findings);
        let percentage = clean_fraction(files.len(), summaries.len());
        if output.status.success() {
            return Evaluation::new(percentage, summaries);
        }

        let detail = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let error = anyhow!(
            "{} exited with {}: {}",
            self.program,
            output.status,
            detail.trim()
        );

        // A failed run that reported nothing analyzed nothing.
        if summaries.is_empty() {
            return Evaluation::default().with_error(error);
        }

        let evaluation = Evaluation::new(percentage, summaries);
        // gofmt -l exits 0 when it only lists files.
        if self.format == OutputFormat::FileList {
            return evaluation.with_error(error);
        }
        evaluation
    }
}

fn parse_file_list(text: &str) -> Vec<Finding> {
    text.lines()
        .map(str::trim)
        .filter(|l| l.ends_with(".go"))
        .map(|file| Finding {
            file: display_path(Path::new(file)),
            line: 1,
            message: "file is not gofmted with -s".to_string(),
        })
        .collect()
}

fn parse_file_line(text: &str) -> Vec<Finding> {
    text.lines()
        .filter_map(|l| FILE_LINE_RE.captures(l.trim_end()))
        .filter_map(|caps| {
            let line = caps["line"].parse().ok()?;
            Some(Finding {
                file: display_path(Path::new(&caps["file"])),
                line,
                message: caps["msg"].to_string(),
            })
        })
        .collect()
}

fn parse_cyclo(text: &str) -> Vec<Finding> {
    text.lines()
        .filter_map(|l| CYCLO_RE.captures(l.trim()))
        .filter_map(|caps| {
            let line = caps["line"].parse().ok()?;
            Some(Finding {
                file: display_path(Path::new(&caps["file"])),
                line,
                message: format!(
                    "gocyclo: cyclomatic complexity {} of function {}() is high (> {})",
                    &caps["complexity"],
                    &caps["func"],
                    super::CYCLO_OVER
                ),
            })
        })
        .collect()
}

/// Group findings per file, keeping the order files were first reported in.
fn group_by_file(findings: Vec<Finding>) -> Vec<FileSummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut summaries: Vec<FileSummary> = Vec::new();

    for f in findings {
        let slot = *index.entry(f.file.clone()).or_insert_with(|| {
            summaries.push(FileSummary::new(f.file.clone()));
            summaries.len() - 1
        });
        summaries[slot].add_issue(f.line, f.message);
    }

    summaries
}
