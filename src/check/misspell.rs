//! Detection of commonly misspelled English words.
//!
//! Scans every line of every file (comments, strings and identifiers alike)
//! against a fixed dictionary of frequent misspellings.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::Regex;

use super::{clean_fraction, display_path, Check, Evaluation, FileSummary};

/// Misspelling and its correction.
const DICTIONARY: &[(&str, &str)] = &[
    ("accomodate", "accommodate"),
    ("acheive", "achieve"),
    ("adress", "address"),
    ("agressive", "aggressive"),
    ("alot", "a lot"),
    ("arguement", "argument"),
    ("begining", "beginning"),
    ("beleive", "believe"),
    ("calender", "calendar"),
    ("commited", "committed"),
    ("comparision", "comparison"),
    ("definately", "definitely"),
    ("dependancy", "dependency"),
    ("enviroment", "environment"),
    ("existance", "existence"),
    ("familar", "familiar"),
    ("finaly", "finally"),
    ("guarentee", "guarantee"),
    ("independant", "independent"),
    ("intial", "initial"),
    ("lenght", "length"),
    ("neccessary", "necessary"),
    ("occured", "occurred"),
    ("occurence", "occurrence"),
    ("paramter", "parameter"),
    ("persistant", "persistent"),
    ("posible", "possible"),
    ("recieve", "receive"),
    ("recieved", "received"),
    ("reciever", "receiver"),
    ("recomend", "recommend"),
    ("refered", "referred"),
    ("relevent", "relevant"),
    ("seperate", "separate"),
    ("seperator", "separator"),
    ("succesful", "successful"),
    ("sucess", "success"),
    ("supress", "suppress"),
    ("teh", "the"),
    ("threshhold", "threshold"),
    ("transfered", "transferred"),
    ("untill", "until"),
    ("wich", "which"),
];

lazy_static! {
    static ref MISSPELLING_RE: Regex = {
        let words: Vec<&str> = DICTIONARY.iter().map(|(wrong, _)| *wrong).collect();
        Regex::new(&format!(r"(?i)\b({})\b", words.join("|"))).unwrap()
    };
    static ref CORRECTIONS: HashMap<&'static str, &'static str> =
        DICTIONARY.iter().copied().collect();
}

pub struct Misspell {
    dir: PathBuf,
}

impl Misspell {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

impl Check for Misspell {
    fn name(&self) -> &str {
        "misspell"
    }

    fn description(&self) -> &str {
        "Misspell Finds commonly misspelled English words"
    }

    fn weight(&self) -> f64 {
        0.0
    }

    fn evaluate(&self, files: &[PathBuf]) -> Evaluation {
        let mut summaries = Vec::new();
        let mut unreadable = Vec::new();

        for file in files {
            match scan_file(&self.dir.join(file)) {
                Ok(issues) if issues.is_empty() => {}
                Ok(issues) => {
                    let mut summary = FileSummary::new(display_path(file));
                    for (line, message) in issues {
                        summary.add_issue(line, message);
                    }
                    summaries.push(summary);
                }
                Err(e) => unreadable.push(format!("{}: {}", display_path(file), e)),
            }
        }

        let percentage = clean_fraction(files.len(), summaries.len());
        let evaluation = Evaluation::new(percentage, summaries);
        if unreadable.is_empty() {
            evaluation
        } else {
            evaluation.with_error(anyhow!("could not read {}", unreadable.join(", ")))
        }
    }
}

/// Return `(line, message)` for every misspelling in the file.
fn scan_file(path: &Path) -> std::io::Result<Vec<(usize, String)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut issues = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        issues.extend(scan_line(&line).into_iter().map(|msg| (idx + 1, msg)));
    }

    Ok(issues)
}

fn scan_line(line: &str) -> Vec<String> {
    MISSPELLING_RE
        .find_iter(line)
        .filter_map(|m| {
            let word = m.as_str();
            CORRECTIONS
                .get(word.to_lowercase().as_str())
                .map(|fix| format!("{:?} is a misspelling of {:?}", word, fix))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_line_finds_words() {
        let found = scan_line("// we recieve the Adress here");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], "\"recieve\" is a misspelling of \"receive\"");
        assert!(found[1].contains("\"Adress\""));
    }

    #[test]
    fn test_scan_line_respects_word_boundaries() {
        assert!(scan_line("var tehran = 1").is_empty());
        assert!(scan_line("the receiver is fine").is_empty());
    }

    #[test]
    fn test_evaluate_scores_clean_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.go"), "package a\n// ok\n").unwrap();
        std::fs::write(temp.path().join("b.go"), "package b\n\n// seperate it\n").unwrap();

        let files = vec![PathBuf::from("a.go"), PathBuf::from("b.go")];
        let eval = Misspell::new(temp.path()).evaluate(&files);

        assert!(eval.error.is_none());
        assert_eq!(eval.percentage, 0.5);
        assert_eq!(eval.summaries.len(), 1);
        assert_eq!(eval.summaries[0].filename, "b.go");
        assert_eq!(eval.summaries[0].issues[0].line, 3);
    }

    #[test]
    fn test_unreadable_file_keeps_partial_result() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.go"), "package a\n").unwrap();

        let files = vec![PathBuf::from("a.go"), PathBuf::from("gone.go")];
        let eval = Misspell::new(temp.path()).evaluate(&files);

        assert_eq!(eval.percentage, 1.0);
        let err = eval.error.expect("missing file should be reported");
        assert!(err.to_string().contains("gone.go"));
    }
}
