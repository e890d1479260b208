//! Discovery of the Go files to analyze.
//!
//! Generated files and files matching the configured exclude globs are not
//! analyzed. Tools like `go vet` work on whole packages, so those files are
//! also moved out of the way for the duration of the run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use globset::GlobSet;
use lazy_static::lazy_static;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::Result;

/// Suffix appended to temporarily excluded files.
pub const SKIP_SUFFIX: &str = ".reportcard-skip";

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["vendor", "testdata", "node_modules", "third_party"];

lazy_static! {
    static ref GENERATED_RE: Regex = Regex::new(r"^// Code generated .* DO NOT EDIT\.$").unwrap();
}

/// Files found under the project root, relative to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Files the checks analyze, sorted.
    pub files: Vec<PathBuf>,
    /// Go files that must not be analyzed, sorted.
    pub skipped: Vec<PathBuf>,
}

/// Walk `dir` collecting `.go` files.
pub fn discover_files(dir: &Path, exclude: &GlobSet) -> Result<Discovery> {
    let mut discovery = Discovery::default();

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !(name.starts_with('.') || name.starts_with('_') || SKIPPED_DIRS.contains(&&*name))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }

        let rel = path.strip_prefix(dir).unwrap_or(path).to_path_buf();
        if exclude.is_match(&rel) || is_generated(path) {
            tracing::debug!(file = %rel.display(), "skipping file");
            discovery.skipped.push(rel);
        } else {
            discovery.files.push(rel);
        }
    }

    discovery.files.sort();
    discovery.skipped.sort();
    Ok(discovery)
}

/// Whether the file carries the standard generated-code marker before its
/// package clause. A file whose header cannot be read counts as hand
/// written.
fn is_generated(path: &Path) -> bool {
    let mut reader = match File::open(path) {
        Ok(file) => BufReader::new(file),
        Err(e) => {
            tracing::warn!(
                file = %path.display(),
                error = %e,
                "could not read file header"
            );
            return false;
        }
    };

    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return false,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    file = %path.display(),
                    error = %e,
                    "could not read file header"
                );
                return false;
            }
        }

        let line = String::from_utf8_lossy(&buf);
        let trimmed = line.trim_end();
        if GENERATED_RE.is_match(trimmed) {
            return true;
        }
        if trimmed.starts_with("package ") {
            return false;
        }
    }
}

/// Files moved aside for the duration of a run.
///
/// Dropping the guard moves them back; failures are logged, never raised.
#[derive(Debug)]
pub struct Exclusion {
    dir: PathBuf,
    moved: Vec<PathBuf>,
    failures: Vec<String>,
}

/// Rename each skipped file to `<name>.reportcard-skip`.
///
/// A file that cannot be moved is logged and recorded in
/// [`Exclusion::failures`]; the run continues without it.
pub fn exclude_temporarily(dir: &Path, skipped: &[PathBuf]) -> Exclusion {
    let mut exclusion = Exclusion {
        dir: dir.to_path_buf(),
        moved: Vec::new(),
        failures: Vec::new(),
    };

    for rel in skipped {
        let from = dir.join(rel);
        let to = skip_path(&from);
        if to.exists() {
            exclusion
                .failures
                .push(format!("{}: {} already exists", rel.display(), to.display()));
            continue;
        }
        match std::fs::rename(&from, &to) {
            Ok(()) => exclusion.moved.push(rel.clone()),
            Err(e) => exclusion.failures.push(format!("{}: {}", rel.display(), e)),
        }
    }

    for failure in &exclusion.failures {
        tracing::warn!(%failure, "could not exclude file");
    }

    exclusion
}

fn skip_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(SKIP_SUFFIX);
    PathBuf::from(name)
}

impl Exclusion {
    /// Files currently moved aside, relative to the project root.
    pub fn moved(&self) -> &[PathBuf] {
        &self.moved
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Move every file back. Returns the first failure, if any; the rest are
    /// only logged.
    pub fn restore(mut self) -> std::io::Result<()> {
        match self.restore_all().into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn restore_all(&mut self) -> Vec<std::io::Error> {
        let mut errors = Vec::new();
        for rel in self.moved.drain(..) {
            let original = self.dir.join(&rel);
            if let Err(e) = std::fs::rename(skip_path(&original), &original) {
                tracing::warn!(file = %rel.display(), error = %e, "could not restore file");
                errors.push(e);
            }
        }
        errors
    }
}

impl Drop for Exclusion {
    fn drop(&mut self) {
        let _ = self.restore_all();
    }
}
