//! Text report for a report card run.
//!
//! One block per check in configured order, then the grade and a final
//! `Passed`/`Failed` line. Issues are only listed for checks that missed
//! their threshold.

use std::io::{self, Write};

use colored::*;

use crate::check::{FileSummary, IssueEntry};
use crate::engine::RunOutcome;
use crate::score::{AggregateResult, CheckVerdict, Score};

/// Final line of a passing report.
pub const PASSED: &str = "Passed";
/// Final line of a failing report.
pub const FAILED: &str = "Failed";

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Color the final verdict.
    pub color: bool,
}

/// Write the full report for `outcome`.
pub fn write_report<W: Write>(
    out: &mut W,
    outcome: &RunOutcome,
    options: ReportOptions,
) -> io::Result<()> {
    write_scores(out, &outcome.scores, &outcome.aggregate)?;
    write_summary(out, &outcome.aggregate)?;
    write_verdict(out, outcome.aggregate.passed, options.color)
}

fn write_scores<W: Write>(
    out: &mut W,
    scores: &[Score],
    aggregate: &AggregateResult,
) -> io::Result<()> {
    for (score, verdict) in scores.iter().zip(&aggregate.verdicts) {
        write_check(out, score, verdict)?;
    }
    Ok(())
}

fn write_check<W: Write>(out: &mut W, score: &Score, verdict: &CheckVerdict) -> io::Result<()> {
    writeln!(
        out,
        "{}: {:.2}% (>= {:.2}% == {})",
        score.name,
        score.percentage * 100.0,
        verdict.threshold,
        verdict.passed
    )?;

    if let Some(error) = score.error.as_deref().filter(|e| !e.is_empty()) {
        writeln!(out, "\tError: {}", error)?;
    }

    if !verdict.passed {
        writeln!(out)?;
        writeln!(out, "Issues:")?;
        write_issues(out, &score.file_summaries)?;
    }

    writeln!(out)
}

fn write_issues<W: Write>(out: &mut W, summaries: &[FileSummary]) -> io::Result<()> {
    for summary in summaries {
        writeln!(out, "\t{}", summary.filename)?;
        for IssueEntry { line, description } in &summary.issues {
            writeln!(out, "\t\tLine Number: {} ({})", line, description)?;
        }
    }
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, aggregate: &AggregateResult) -> io::Result<()> {
    let percentage = aggregate.percentage * 100.0;
    writeln!(out, "Grade: {} ({:.2}%)", aggregate.grade, percentage)
}

fn write_verdict<W: Write>(out: &mut W, passed: bool, color: bool) -> io::Result<()> {
    let token = if passed { PASSED } else { FAILED };
    if !color {
        return writeln!(out, "{}", token);
    }
    if passed {
        writeln!(out, "{}", token.green().bold())
    } else {
        writeln!(out, "{}", token.red().bold())
    }
}

/// Render the report to a string, without color.
pub fn render(outcome: &RunOutcome) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_report(&mut buf, outcome, ReportOptions::default());
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{self, Score};
    use crate::threshold::ThresholdMap;

    fn make_score(name: &str, weight: f64, percentage: f64) -> Score {
        Score {
            name: name.to_string(),
            description: format!("{} description", name),
            weight,
            percentage,
            file_summaries: Vec::new(),
            error: None,
        }
    }

    fn outcome(scores: Vec<Score>, specs: &[&str]) -> RunOutcome {
        let names: Vec<&str> = scores.iter().map(|s| s.name.as_str()).collect();
        let thresholds = ThresholdMap::parse(specs, &names).unwrap();
        let aggregate = score::calculate(&scores, &thresholds).unwrap();
        RunOutcome { scores, aggregate }
    }

    #[test]
    fn test_passing_report() {
        let text = render(&outcome(
            vec![make_score("gofmt", 0.3, 1.0), make_score("golint", 0.1, 0.5)],
            &["gofmt=90"],
        ));

        let expected = "gofmt: 100.00% (>= 90.00% == true)\n\
                        \n\
                        golint: 50.00% (>= 0.00% == true)\n\
                        \n\
                        Grade: A (87.50%)\n\
                        Passed\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_failing_check_lists_issues() {
        let mut lint = make_score("golint", 1.0, 0.5);
        let mut summary = FileSummary::new("main.go");
        summary.add_issue(12, "exported function Run should have comment");
        summary.add_issue(3, "package comment missing");
        lint.file_summaries.push(summary);
        lint.file_summaries.push(FileSummary::new("util.go"));

        let text = render(&outcome(
            vec![lint, make_score("gofmt", 3.0, 0.9)],
            &["golint=60"],
        ));

        let expected = "golint: 50.00% (>= 60.00% == false)\n\
                        \n\
                        Issues:\n\
                        \tmain.go\n\
                        \t\tLine Number: 12 (exported function Run should have comment)\n\
                        \t\tLine Number: 3 (package comment missing)\n\
                        \tutil.go\n\
                        \n\
                        gofmt: 90.00% (>= 0.00% == true)\n\
                        \n\
                        Grade: A (80.00%)\n\
                        Failed\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_passing_check_hides_issues() {
        let mut lint = make_score("golint", 1.0, 0.5);
        let mut summary = FileSummary::new("main.go");
        summary.add_issue(1, "hidden");
        lint.file_summaries.push(summary);

        let text = render(&outcome(vec![lint], &[]));
        assert!(!text.contains("Issues:"));
        assert!(!text.contains("hidden"));
    }

    #[test]
    fn test_error_is_annotated_with_percentage() {
        let mut vet = make_score("go_vet", 1.0, 0.73);
        vet.error = Some("go vet exited with exit status: 2".to_string());

        let text = render(&outcome(vec![vet], &[]));
        assert!(text.starts_with("go_vet: 73.00% (>= 0.00% == true)\n\tError: go vet exited"));
        assert!(text.ends_with("Passed\n"));
    }

    #[test]
    fn test_plain_verdict_without_color() {
        let mut buf = Vec::new();
        write_verdict(&mut buf, false, false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Failed\n");
    }
}
