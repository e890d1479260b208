//! Check that the project ships a license file.

use std::path::{Path, PathBuf};

use anyhow::anyhow;

use super::{Check, Evaluation, FileSummary};

/// File stems accepted as a license, compared case-insensitively.
const LICENSE_STEMS: &[&str] = &["license", "licence", "copying", "unlicense"];

pub struct License {
    dir: PathBuf,
}

impl License {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn find_license(&self) -> std::io::Result<Option<String>> {
        let mut names: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();

        Ok(names.into_iter().find(|name| is_license_name(name)))
    }
}

/// `LICENSE`, `LICENSE.md`, `COPYING.txt`, `LICENSE-MIT` and friends.
fn is_license_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    LICENSE_STEMS.iter().any(|stem| {
        lower == *stem
            || lower
                .strip_prefix(stem)
                .map(|rest| rest.starts_with('.') || rest.starts_with('-'))
                .unwrap_or(false)
    })
}

impl Check for License {
    fn name(&self) -> &str {
        "license"
    }

    fn description(&self) -> &str {
        "Checks whether your project has a LICENSE file."
    }

    fn weight(&self) -> f64 {
        0.10
    }

    fn evaluate(&self, _files: &[PathBuf]) -> Evaluation {
        match self.find_license() {
            Ok(Some(name)) => {
                tracing::debug!(file = %name, "found license file");
                Evaluation::new(1.0, Vec::new())
            }
            Ok(None) => {
                let mut summary = FileSummary::new("LICENSE");
                summary.add_issue(1, "no license file found in the project root");
                Evaluation::new(0.0, vec![summary])
            }
            Err(e) => Evaluation::default().with_error(anyhow!(
                "listing {}: {}",
                self.dir.display(),
                e
            )),
        }
    }
}
