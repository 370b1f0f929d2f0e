//! Presentation helpers: score bands and the Eisenhower matrix.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::scoring::{ScoreError, due_date_of};
use crate::task::{Task, TaskId};
use crate::time::days_until;

/// Due within this many days (or overdue) counts as urgent.
pub const URGENT_WITHIN_DAYS: i64 = 2;

/// Importance at or above this counts as important.
pub const IMPORTANT_AT: i64 = 7;

/// Coarse bucket for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    /// Circular tasks (score 0) land in `High` so they get looked at.
    pub fn of(score: f64) -> Self {
        if score == 0.0 || score >= 70.0 {
            ScoreBand::High
        } else if score >= 40.0 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::High => "high",
            ScoreBand::Medium => "medium",
            ScoreBand::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// Urgent and important.
    DoFirst,
    /// Important, not urgent.
    Schedule,
    /// Urgent, not important.
    Delegate,
    Eliminate,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::DoFirst,
        Quadrant::Schedule,
        Quadrant::Delegate,
        Quadrant::Eliminate,
    ];

    /// `cycles` is the set from `detect_cycles`. Circular tasks are never
    /// urgent and their due date is not parsed.
    pub fn classify(
        task: &Task,
        today: NaiveDate,
        cycles: &HashSet<TaskId>,
    ) -> Result<Self, ScoreError> {
        let urgent = if cycles.contains(&task.id) {
            false
        } else {
            due_date_of(task)?
                .map(|d| days_until(d, today) <= URGENT_WITHIN_DAYS)
                .unwrap_or(false)
        };
        let important = task.importance_or_default() >= IMPORTANT_AT;

        Ok(match (urgent, important) {
            (true, true) => Quadrant::DoFirst,
            (false, true) => Quadrant::Schedule,
            (true, false) => Quadrant::Delegate,
            (false, false) => Quadrant::Eliminate,
        })
    }

    pub fn title(self) -> &'static str {
        match self {
            Quadrant::DoFirst => "Urgent & important",
            Quadrant::Schedule => "Important, not urgent",
            Quadrant::Delegate => "Urgent, not important",
            Quadrant::Eliminate => "Neither urgent nor important",
        }
    }
}
