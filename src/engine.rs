//! Aggregation engine that runs every check concurrently.
//!
//! Each check is evaluated on the blocking pool in its own task. Results are
//! gathered at a single fan-in point and put back into configured order, so
//! the report never depends on which check finished first.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::task::{JoinError, JoinHandle};

use crate::check::{Check, Evaluation};
use crate::error::{ReportCardError, Result};
use crate::score::{self, AggregateResult, Score};
use crate::threshold::ThresholdMap;

/// Scores plus the aggregate computed from them.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// One score per check, in configured order.
    pub scores: Vec<Score>,
    pub aggregate: AggregateResult,
}

/// Runs a fixed, ordered list of checks and aggregates their scores.
pub struct Engine {
    checks: Vec<Arc<dyn Check>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("checks", &self.check_names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Engine {
    /// Create an engine for `checks`.
    ///
    /// Rejects duplicate names, negative or non-finite weights, and a check
    /// list whose total weight is zero.
    pub fn new(checks: Vec<Box<dyn Check>>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        let mut total_weight = 0.0;

        for check in &checks {
            if !seen.insert(check.name().to_string()) {
                return Err(ReportCardError::DuplicateCheck(check.name().to_string()));
            }
            let weight = check.weight();
            if !weight.is_finite() || weight < 0.0 {
                return Err(ReportCardError::InvalidWeight {
                    name: check.name().to_string(),
                    weight,
                });
            }
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            return Err(ReportCardError::ZeroWeight);
        }

        Ok(Self {
            checks: checks.into_iter().map(Arc::from).collect(),
            timeout: None,
        })
    }

    /// Bound how long a single check may run. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Evaluate every check against `files` and return one score per check
    /// in configured order.
    pub async fn run(&self, files: Arc<[PathBuf]>) -> Vec<Score> {
        let handles: Vec<(usize, JoinHandle<Evaluation>)> = self
            .checks
            .iter()
            .enumerate()
            .map(|(idx, check)| {
                let check = Arc::clone(check);
                let files = Arc::clone(&files);
                tracing::debug!(check = check.name(), "starting check");
                (
                    idx,
                    tokio::task::spawn_blocking(move || check.evaluate(&files)),
                )
            })
            .collect();

        let timeout = self.timeout;
        let mut arrivals: Vec<(usize, TaskOutcome)> = stream::iter(handles)
            .map(|(idx, handle)| async move { (idx, wait_for(handle, timeout).await) })
            .buffer_unordered(self.checks.len().max(1))
            .collect()
            .await;

        arrivals.sort_by_key(|(idx, _)| *idx);
        arrivals
            .into_iter()
            .map(|(idx, outcome)| make_score(self.checks[idx].as_ref(), outcome))
            .collect()
    }

    /// Run every check and score the results against `thresholds`.
    pub async fn evaluate(
        &self,
        files: Arc<[PathBuf]>,
        thresholds: &ThresholdMap,
    ) -> Result<RunOutcome> {
        let scores = self.run(files).await;
        let aggregate = score::calculate(&scores, thresholds)?;
        Ok(RunOutcome { scores, aggregate })
    }
}

/// What came back from one check task.
enum TaskOutcome {
    Finished(Evaluation),
    /// The task panicked or timed out; no percentage is available.
    Lost(String),
}

async fn wait_for(handle: JoinHandle<Evaluation>, timeout: Option<Duration>) -> TaskOutcome {
    let joined = match timeout {
        None => handle.await,
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                return TaskOutcome::Lost(format!(
                    "timed out after {}s",
                    limit.as_secs_f64()
                ))
            }
        },
    };

    match joined {
        Ok(evaluation) => TaskOutcome::Finished(evaluation),
        Err(e) => TaskOutcome::Lost(join_error_message(e)),
    }
}

fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        format!("check panicked: {}", panic_message(err.into_panic()))
    } else {
        "check was cancelled".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Turn a task outcome into a score, keeping the percentage of a check
/// that reported an error.
fn make_score(check: &dyn Check, outcome: TaskOutcome) -> Score {
    let (mut percentage, file_summaries, mut errors) = match outcome {
        TaskOutcome::Finished(eval) => {
            let errors: Vec<String> = eval.error.iter().map(|e| format!("{:#}", e)).collect();
            (eval.percentage, eval.summaries, errors)
        }
        TaskOutcome::Lost(reason) => {
            tracing::warn!(check = check.name(), %reason, "check did not complete");
            (0.0, Vec::new(), vec![reason])
        }
    };

    if percentage.is_nan() {
        errors.push("check reported NaN percentage".to_string());
        percentage = 0.0;
    } else if !(0.0..=1.0).contains(&percentage) {
        tracing::warn!(check = check.name(), percentage, "clamping out of range percentage");
        errors.push(format!("percentage {} out of range", percentage));
        percentage = percentage.clamp(0.0, 1.0);
    }

    let error = if errors.is_empty() {
        None
    } else {
        let message = errors.join("; ");
        tracing::error!(check = check.name(), error = %message, "check reported an error");
        Some(message)
    };

    Score {
        name: check.name().to_string(),
        description: check.description().to_string(),
        weight: check.weight(),
        percentage,
        file_summaries,
        error,
    }
}
