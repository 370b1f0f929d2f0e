//! Weighted, explainable priority scoring.
//!
//! Each task gets four sub-scores (urgency, importance, effort, dependency),
//! combined by [`Weights::combine`] and rounded to two decimals. Tasks caught
//! by [`detect_cycles`] short-circuit to a score of 0.

use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::cycles::detect_cycles;
use crate::task::{ScoredTask, Task, TaskId};
use crate::time::{days_until, parse_due_date};
use crate::weights::Weights;

pub const CIRCULAR_EXPLANATION: &str = "Circular dependency detected. Resolve this first.";

const NOTE_SEPARATOR: &str = "; ";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("task {id}: cannot parse due date '{value}'")]
    InvalidDueDate { id: TaskId, value: String },
}

/// Urgency sub-score (0-100) plus its explanation note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    NoDueDate,
    Overdue,
    DueToday,
    DueIn(i64),
}

impl Urgency {
    pub fn of(due: Option<NaiveDate>, today: NaiveDate) -> Self {
        match due.map(|d| days_until(d, today)) {
            None => Urgency::NoDueDate,
            Some(n) if n < 0 => Urgency::Overdue,
            Some(0) => Urgency::DueToday,
            Some(n) => Urgency::DueIn(n),
        }
    }

    pub fn score(self) -> f64 {
        match self {
            Urgency::NoDueDate => 30.0,
            Urgency::Overdue => 100.0,
            Urgency::DueToday => 90.0,
            Urgency::DueIn(days) => 100_i64.saturating_sub(days.saturating_mul(5)).max(10) as f64,
        }
    }

    pub fn note(self) -> String {
        match self {
            Urgency::NoDueDate => "No due date".to_string(),
            Urgency::Overdue => "Past due date → very urgent".to_string(),
            Urgency::DueToday => "Due today → urgent".to_string(),
            Urgency::DueIn(days) => format!("Due in {days} days"),
        }
    }
}

/// Parse a task's due date, if it has one.
pub fn due_date_of(task: &Task) -> Result<Option<NaiveDate>, ScoreError> {
    match task.due_date_str() {
        None => Ok(None),
        Some(raw) => parse_due_date(raw)
            .map(Some)
            .ok_or_else(|| ScoreError::InvalidDueDate {
                id: task.id.clone(),
                value: raw.to_string(),
            }),
    }
}

fn importance_factor(importance: i64) -> f64 {
    importance as f64 * 10.0
}

/// Smaller jobs score higher, floored at 5.
fn effort_factor(hours: f64) -> f64 {
    (30.0 - hours * 3.0).max(5.0)
}

/// Counts every listed dependency, dangling ones included. Capped at 40.
fn dependency_factor(count: usize) -> f64 {
    (count.saturating_mul(10)).min(40) as f64
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn score_one(
    task: &Task,
    cycles: &HashSet<TaskId>,
    weights: &Weights,
    today: NaiveDate,
) -> Result<ScoredTask, ScoreError> {
    if cycles.contains(&task.id) {
        trace!(id = %task.id, "circular, scored 0");
        return Ok(ScoredTask {
            task: task.clone(),
            score: 0.0,
            explanation: CIRCULAR_EXPLANATION.to_string(),
        });
    }

    let urgency = Urgency::of(due_date_of(task)?, today);
    let importance = task.importance_or_default();
    let hours = task.hours_or_default();
    let dep_count = task.deps().len();

    let raw = weights.combine(
        urgency.score(),
        importance_factor(importance),
        effort_factor(hours),
        dependency_factor(dep_count),
    );
    let score = round2(raw);

    let explanation = [
        urgency.note(),
        format!("Importance = {importance}"),
        format!("Effort: {hours} hrs"),
        format!("{dep_count} dependencies"),
    ]
    .join(NOTE_SEPARATOR);

    trace!(id = %task.id, score, "scored");
    Ok(ScoredTask {
        task: task.clone(),
        score,
        explanation,
    })
}

/// Score a batch against an explicit "today". Output keeps input order.
///
/// Fails the whole batch on the first non-circular task whose due date does
/// not parse.
pub fn score_tasks_on(
    tasks: &[Task],
    weights: &Weights,
    today: NaiveDate,
) -> Result<Vec<ScoredTask>, ScoreError> {
    let cycles = detect_cycles(tasks);

    let scored = tasks
        .iter()
        .map(|t| score_one(t, &cycles, weights, today))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|e| warn!(error = %e, "scoring aborted"))?;

    debug!(
        tasks = scored.len(),
        circular = cycles.len(),
        %today,
        "batch scored"
    );
    Ok(scored)
}

/// Score a batch using the local system date as "today".
pub fn score_tasks(tasks: &[Task], weights: &Weights) -> Result<Vec<ScoredTask>, ScoreError> {
    score_tasks_on(tasks, weights, Local::now().date_naive())
}
